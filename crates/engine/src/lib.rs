pub mod cell;
pub mod sheet;
pub mod style;
pub mod workbook;

pub use sheet::{Sheet, SheetId};
pub use workbook::{SheetNotFound, Workbook};
