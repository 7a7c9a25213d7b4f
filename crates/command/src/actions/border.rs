use tabula_engine::cell::is_valid_color;
use tabula_engine::Sheet;

use super::{check_range, check_value_count, compact, value_at, SheetMutation};
use crate::action_data::{ActionPayload, SetBorder};
use crate::error::ValidationError;

impl SheetMutation for SetBorder {
    fn validate(&self, sheet: &Sheet) -> Result<(), ValidationError> {
        check_range(sheet, &self.range)?;
        check_value_count(&self.range, self.lines.len())?;
        match self.lines.iter().flatten().find(|line| !is_valid_color(&line.color)) {
            Some(line) => Err(ValidationError::InvalidBorderColor(line.color.clone())),
            None => Ok(()),
        }
    }

    fn apply(&self, sheet: &mut Sheet) -> ActionPayload {
        let previous: Vec<_> = self
            .range
            .cells()
            .enumerate()
            .map(|(i, (row, col))| sheet.set_border(row, col, self.side, value_at(&self.lines, i).clone()))
            .collect();

        SetBorder {
            range: self.range,
            side: self.side,
            lines: compact(previous),
        }
        .into()
    }
}
