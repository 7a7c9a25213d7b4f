//! The serializable "what to do" records.
//!
//! An `ActionData` names its target sheet and carries a typed payload; the
//! payload's variant is the action kind. On the wire it is one flat object:
//!
//! ```json
//! {"sheet_id": 1, "kind": "set_sheet_name", "name": "Budget"}
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use tabula_core::CellRange;
use tabula_engine::cell::{BorderLine, BorderSide};
use tabula_engine::style::StyleValue;
use tabula_engine::SheetId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionData {
    pub sheet_id: SheetId,
    #[serde(flatten)]
    pub payload: ActionPayload,
}

impl ActionData {
    pub fn new(sheet_id: SheetId, payload: impl Into<ActionPayload>) -> Self {
        Self { sheet_id, payload: payload.into() }
    }

    pub fn kind(&self) -> ActionKind {
        self.payload.kind()
    }

    pub fn set_sheet_name(sheet_id: SheetId, name: impl Into<String>) -> Self {
        Self::new(sheet_id, SetSheetName { name: name.into() })
    }

    pub fn set_frozen_rows(sheet_id: SheetId, count: i64) -> Self {
        Self::new(sheet_id, SetFrozenRows { count })
    }

    pub fn set_frozen_columns(sheet_id: SheetId, count: i64) -> Self {
        Self::new(sheet_id, SetFrozenColumns { count })
    }

    /// Broadcast one style value over every cell of `range`.
    pub fn set_range_style(sheet_id: SheetId, range: CellRange, value: StyleValue) -> Self {
        Self::new(sheet_id, SetRangeStyle { range, values: vec![value] })
    }

    /// Broadcast one border line (or its removal) over one side of every cell.
    pub fn set_border(sheet_id: SheetId, range: CellRange, side: BorderSide, line: Option<BorderLine>) -> Self {
        Self::new(sheet_id, SetBorder { range, side, lines: vec![line] })
    }

    pub fn add_merges(sheet_id: SheetId, ranges: Vec<CellRange>) -> Self {
        Self::new(sheet_id, AddMerges { ranges })
    }

    pub fn remove_merges(sheet_id: SheetId, ranges: Vec<CellRange>) -> Self {
        Self::new(sheet_id, RemoveMerges { ranges })
    }
}

/// Closed set of action kinds; the factory in `actions` is keyed on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    SetSheetName,
    SetFrozenRows,
    SetFrozenColumns,
    SetRangeStyle,
    SetBorder,
    AddMerges,
    RemoveMerges,
}

impl ActionKind {
    pub const ALL: [ActionKind; 7] = [
        ActionKind::SetSheetName,
        ActionKind::SetFrozenRows,
        ActionKind::SetFrozenColumns,
        ActionKind::SetRangeStyle,
        ActionKind::SetBorder,
        ActionKind::AddMerges,
        ActionKind::RemoveMerges,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::SetSheetName => "set_sheet_name",
            ActionKind::SetFrozenRows => "set_frozen_rows",
            ActionKind::SetFrozenColumns => "set_frozen_columns",
            ActionKind::SetRangeStyle => "set_range_style",
            ActionKind::SetBorder => "set_border",
            ActionKind::AddMerges => "add_merges",
            ActionKind::RemoveMerges => "remove_merges",
        }
    }

    /// One-line description, for `tabula kinds`.
    pub fn describe(&self) -> &'static str {
        match self {
            ActionKind::SetSheetName => "rename a sheet {name}",
            ActionKind::SetFrozenRows => "freeze the top {count} rows",
            ActionKind::SetFrozenColumns => "freeze the leftmost {count} columns",
            ActionKind::SetRangeStyle => "set one style attribute over {range} ({values}: one, or one per cell)",
            ActionKind::SetBorder => "set one border {side} over {range} ({lines}: one, or one per cell)",
            ActionKind::AddMerges => "merge each of {ranges}",
            ActionKind::RemoveMerges => "break apart every merge touching {ranges}",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionPayload {
    SetSheetName(SetSheetName),
    SetFrozenRows(SetFrozenRows),
    SetFrozenColumns(SetFrozenColumns),
    SetRangeStyle(SetRangeStyle),
    SetBorder(SetBorder),
    AddMerges(AddMerges),
    RemoveMerges(RemoveMerges),
}

impl ActionPayload {
    pub fn kind(&self) -> ActionKind {
        match self {
            ActionPayload::SetSheetName(_) => ActionKind::SetSheetName,
            ActionPayload::SetFrozenRows(_) => ActionKind::SetFrozenRows,
            ActionPayload::SetFrozenColumns(_) => ActionKind::SetFrozenColumns,
            ActionPayload::SetRangeStyle(_) => ActionKind::SetRangeStyle,
            ActionPayload::SetBorder(_) => ActionKind::SetBorder,
            ActionPayload::AddMerges(_) => ActionKind::AddMerges,
            ActionPayload::RemoveMerges(_) => ActionKind::RemoveMerges,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetSheetName {
    pub name: String,
}

/// Signed so that a negative count from a caller is a validation failure,
/// not a deserialization error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetFrozenRows {
    pub count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetFrozenColumns {
    pub count: i64,
}

/// `values` holds either one value for the whole range or one per cell in
/// row-major order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetRangeStyle {
    pub range: CellRange,
    pub values: Vec<StyleValue>,
}

/// `lines` follows the same one-or-per-cell rule as `SetRangeStyle::values`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetBorder {
    pub range: CellRange,
    pub side: BorderSide,
    pub lines: Vec<Option<BorderLine>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddMerges {
    pub ranges: Vec<CellRange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveMerges {
    pub ranges: Vec<CellRange>,
}

macro_rules! impl_into_payload {
    ($($name:ident),* $(,)?) => {
        $(
            impl From<$name> for ActionPayload {
                fn from(value: $name) -> Self {
                    ActionPayload::$name(value)
                }
            }
        )*
    };
}

impl_into_payload!(
    SetSheetName,
    SetFrozenRows,
    SetFrozenColumns,
    SetRangeStyle,
    SetBorder,
    AddMerges,
    RemoveMerges,
);
