use tabula_engine::Sheet;

use super::{check_range, check_value_count, compact, value_at, SheetMutation};
use crate::action_data::{ActionPayload, SetRangeStyle};
use crate::error::ValidationError;

impl SheetMutation for SetRangeStyle {
    fn validate(&self, sheet: &Sheet) -> Result<(), ValidationError> {
        check_range(sheet, &self.range)?;
        check_value_count(&self.range, self.values.len())?;

        let attribute = self.values[0].attribute();
        if self.values.iter().any(|v| v.attribute() != attribute) {
            return Err(ValidationError::MixedStyleAttributes);
        }
        for value in &self.values {
            value.check().map_err(ValidationError::InvalidStyle)?;
        }
        Ok(())
    }

    fn apply(&self, sheet: &mut Sheet) -> ActionPayload {
        let previous: Vec<_> = self
            .range
            .cells()
            .enumerate()
            .map(|(i, (row, col))| sheet.set_style(row, col, value_at(&self.values, i)))
            .collect();

        SetRangeStyle {
            range: self.range,
            values: compact(previous),
        }
        .into()
    }
}
