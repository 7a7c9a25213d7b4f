use serde::{Deserialize, Serialize};

use crate::range::CellRange;

/// The range list a toolbar operation targets: ordered ranges plus the active one.
///
/// Never empty, and `active_range` always indexes `ranges`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSelection")]
pub struct Selection {
    ranges: Vec<CellRange>,
    active_range: usize,
}

#[derive(Deserialize)]
struct RawSelection {
    ranges: Vec<CellRange>,
    active_range: usize,
}

impl TryFrom<RawSelection> for Selection {
    type Error = &'static str;

    fn try_from(raw: RawSelection) -> Result<Self, Self::Error> {
        if raw.active_range >= raw.ranges.len() {
            return Err("active_range must index a non-empty range list");
        }
        Ok(Self { ranges: raw.ranges, active_range: raw.active_range })
    }
}

impl Selection {
    /// Create a selection with a single range.
    pub fn new(range: CellRange) -> Self {
        Self {
            ranges: vec![range],
            active_range: 0,
        }
    }

    /// Build from a list of ranges; the last one becomes active.
    /// Returns None for an empty list.
    pub fn from_ranges(ranges: Vec<CellRange>) -> Option<Self> {
        if ranges.is_empty() {
            return None;
        }
        let active_range = ranges.len() - 1;
        Some(Self { ranges, active_range })
    }

    pub fn ranges(&self) -> &[CellRange] {
        &self.ranges
    }

    pub fn active_range(&self) -> CellRange {
        self.ranges[self.active_range]
    }

    /// Get the active cell (top-left of active range).
    pub fn active_cell(&self) -> (usize, usize) {
        let range = self.active_range();
        (range.start_row, range.start_col)
    }

    /// Add a new range (ctrl+click) and make it active.
    pub fn add_range(&mut self, range: CellRange) {
        self.ranges.push(range);
        self.active_range = self.ranges.len() - 1;
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.ranges.iter().any(|r| r.contains(row, col))
    }

    /// Total number of selected cells (overlapping ranges count twice).
    pub fn cell_count(&self) -> usize {
        self.ranges.iter().map(|r| r.cell_count()).sum()
    }
}

impl From<CellRange> for Selection {
    fn from(range: CellRange) -> Self {
        Self::new(range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_list_rejected() {
        assert!(Selection::from_ranges(Vec::new()).is_none());
    }

    #[test]
    fn test_add_range_becomes_active() {
        let mut sel = Selection::new(CellRange::single(0, 0));
        sel.add_range(CellRange::new(2, 2, 4, 5));

        assert_eq!(sel.ranges().len(), 2);
        assert_eq!(sel.active_cell(), (2, 2));
        assert!(sel.contains(0, 0));
        assert!(sel.contains(3, 3));
        assert!(!sel.contains(1, 1));
        assert_eq!(sel.cell_count(), 1 + 12);
    }

    #[test]
    fn test_deserialize_checks_active_index() {
        let sel: Selection = serde_json::from_str(
            r#"{"ranges":[{"start_row":0,"start_col":0,"end_row":1,"end_col":1}],"active_range":0}"#,
        )
        .unwrap();
        assert_eq!(sel.active_range(), CellRange::new(0, 0, 1, 1));

        assert!(serde_json::from_str::<Selection>(r#"{"ranges":[],"active_range":0}"#).is_err());
        assert!(serde_json::from_str::<Selection>(
            r#"{"ranges":[{"start_row":0,"start_col":0,"end_row":0,"end_col":0}],"active_range":1}"#,
        )
        .is_err());
    }
}
