use tabula_engine::Sheet;

use super::SheetMutation;
use crate::action_data::{ActionPayload, SetFrozenColumns, SetFrozenRows};
use crate::error::ValidationError;

fn check_count(axis: &'static str, count: i64, max: usize) -> Result<(), ValidationError> {
    if count >= 0 && (count as u64) <= max as u64 {
        Ok(())
    } else {
        Err(ValidationError::FreezeOutOfRange { axis, count, max })
    }
}

// Validation has already ruled out negatives by the time apply runs.
fn to_count(count: i64) -> usize {
    count.max(0) as usize
}

impl SheetMutation for SetFrozenRows {
    fn validate(&self, sheet: &Sheet) -> Result<(), ValidationError> {
        check_count("row", self.count, sheet.rows)
    }

    fn apply(&self, sheet: &mut Sheet) -> ActionPayload {
        let previous = sheet.set_frozen_rows(to_count(self.count));
        SetFrozenRows { count: previous as i64 }.into()
    }
}

impl SheetMutation for SetFrozenColumns {
    fn validate(&self, sheet: &Sheet) -> Result<(), ValidationError> {
        check_count("column", self.count, sheet.cols)
    }

    fn apply(&self, sheet: &mut Sheet) -> ActionPayload {
        let previous = sheet.set_frozen_cols(to_count(self.count));
        SetFrozenColumns { count: previous as i64 }.into()
    }
}
