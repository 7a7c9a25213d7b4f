//! Per-kind mutation logic.
//!
//! Every primitive has the same shape: write a value into the sheet and hand
//! back the payload that writes the overwritten value back. `Action` uses that
//! one primitive for perform, redo and undo.

mod border;
mod freeze;
mod merge;
mod sheet_name;
mod style;

use tabula_core::CellRange;
use tabula_engine::Sheet;

use crate::action_data::ActionPayload;
use crate::error::ValidationError;

pub trait SheetMutation {
    /// Precondition gate; runs before anything is written.
    fn validate(&self, sheet: &Sheet) -> Result<(), ValidationError>;

    /// Write into `sheet`, returning the payload that restores what was overwritten.
    fn apply(&self, sheet: &mut Sheet) -> ActionPayload;
}

impl ActionPayload {
    /// Factory keyed on the action kind.
    pub fn mutation(&self) -> &dyn SheetMutation {
        match self {
            ActionPayload::SetSheetName(m) => m,
            ActionPayload::SetFrozenRows(m) => m,
            ActionPayload::SetFrozenColumns(m) => m,
            ActionPayload::SetRangeStyle(m) => m,
            ActionPayload::SetBorder(m) => m,
            ActionPayload::AddMerges(m) => m,
            ActionPayload::RemoveMerges(m) => m,
        }
    }
}

fn check_range(sheet: &Sheet, range: &CellRange) -> Result<(), ValidationError> {
    if sheet.contains_range(range) {
        Ok(())
    } else {
        Err(ValidationError::RangeOutOfBounds(*range))
    }
}

/// Values are either broadcast (one) or given per cell in row-major order.
fn check_value_count(range: &CellRange, count: usize) -> Result<(), ValidationError> {
    let expected = range.cell_count();
    if count == 1 || count == expected {
        Ok(())
    } else {
        Err(ValidationError::ValueCountMismatch { expected, actual: count })
    }
}

fn value_at<T>(values: &[T], index: usize) -> &T {
    if values.len() == 1 {
        &values[0]
    } else {
        &values[index]
    }
}

/// Collapse a per-cell list to a single broadcast value when every entry agrees.
fn compact<T: PartialEq>(mut values: Vec<T>) -> Vec<T> {
    if values.len() > 1 && values.windows(2).all(|w| w[0] == w[1]) {
        values.truncate(1);
    }
    values
}
