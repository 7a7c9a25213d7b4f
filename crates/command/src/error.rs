use tabula_core::CellRange;
use tabula_engine::{SheetId, SheetNotFound};

use crate::command::CommandHandle;

/// Why an action was refused before it touched the workbook.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("unknown sheet {0}")]
    UnknownSheet(SheetId),

    #[error("command has no actions")]
    EmptyCommand,

    #[error("sheet name cannot be empty")]
    EmptySheetName,

    #[error("frozen {axis} count {count} outside 0..={max}")]
    FreezeOutOfRange { axis: &'static str, count: i64, max: usize },

    #[error("range {0} is reversed or outside the sheet")]
    RangeOutOfBounds(CellRange),

    #[error("expected 1 or {expected} values, got {actual}")]
    ValueCountMismatch { expected: usize, actual: usize },

    #[error("style values must all set the same attribute")]
    MixedStyleAttributes,

    #[error("invalid style value: {0}")]
    InvalidStyle(String),

    #[error("invalid border color '{0}'")]
    InvalidBorderColor(String),

    #[error("merge {0} covers a single cell")]
    SingleCellMerge(CellRange),

    #[error("merge {0} overlaps {1}")]
    OverlappingMerge(CellRange, CellRange),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    /// Refused up front; nothing was pushed and the workbook is unchanged.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A history entry referred to a sheet that no longer exists. The entry
    /// has been dropped from history.
    #[error("history entry {entry} dropped: {source}")]
    TargetNotFound {
        entry: CommandHandle,
        #[source]
        source: SheetNotFound,
    },
}

impl CommandError {
    pub fn is_validation(&self) -> bool {
        matches!(self, CommandError::Validation(_))
    }
}
