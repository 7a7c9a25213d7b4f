pub mod range;
pub mod selection;

pub use range::CellRange;
pub use selection::Selection;
