use tabula_engine::sheet::is_valid_sheet_name;
use tabula_engine::Sheet;

use super::SheetMutation;
use crate::action_data::{ActionPayload, SetSheetName};
use crate::error::ValidationError;

// Duplicate names are accepted here; collision policy belongs to the caller.
impl SheetMutation for SetSheetName {
    fn validate(&self, _sheet: &Sheet) -> Result<(), ValidationError> {
        if is_valid_sheet_name(&self.name) {
            Ok(())
        } else {
            Err(ValidationError::EmptySheetName)
        }
    }

    fn apply(&self, sheet: &mut Sheet) -> ActionPayload {
        let previous = sheet.set_name(&self.name);
        SetSheetName { name: previous }.into()
    }
}
