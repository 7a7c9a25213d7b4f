use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tabula_core::CellRange;

use crate::cell::{BorderLine, BorderSide, CellFormat};
use crate::style::{StyleAttribute, StyleValue};

/// Stable sheet identity. Monotonically assigned by the workbook, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SheetId(pub u64);

impl SheetId {
    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SheetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub id: SheetId,
    name: String,
    pub rows: usize,
    pub cols: usize,
    #[serde(default)]
    frozen_rows: usize,
    #[serde(default)]
    frozen_cols: usize,
    /// Merged regions, kept sorted and pairwise disjoint.
    #[serde(default)]
    merges: Vec<CellRange>,
    /// Only non-default formats are stored.
    #[serde(default, with = "format_entries")]
    formats: FxHashMap<(usize, usize), CellFormat>,
}

impl Sheet {
    pub fn new(id: SheetId, rows: usize, cols: usize) -> Self {
        Self {
            id,
            name: format!("Sheet{}", id.raw()),
            rows,
            cols,
            frozen_rows: 0,
            frozen_cols: 0,
            merges: Vec::new(),
            formats: FxHashMap::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the display name, returning the previous one.
    pub fn set_name(&mut self, name: &str) -> String {
        std::mem::replace(&mut self.name, name.to_string())
    }

    // =========================================================================
    // Frozen panes
    // =========================================================================

    pub fn frozen_rows(&self) -> usize {
        self.frozen_rows
    }

    pub fn frozen_cols(&self) -> usize {
        self.frozen_cols
    }

    /// Returns the previous frozen row count.
    pub fn set_frozen_rows(&mut self, count: usize) -> usize {
        std::mem::replace(&mut self.frozen_rows, count)
    }

    /// Returns the previous frozen column count.
    pub fn set_frozen_cols(&mut self, count: usize) -> usize {
        std::mem::replace(&mut self.frozen_cols, count)
    }

    // =========================================================================
    // Merges
    // =========================================================================

    pub fn merges(&self) -> &[CellRange] {
        &self.merges
    }

    /// The first existing merge intersecting `range`, in sorted order.
    pub fn merge_overlapping(&self, range: &CellRange) -> Option<CellRange> {
        self.merges.iter().copied().find(|m| m.overlaps(range))
    }

    /// Add a merged region. Callers check it doesn't overlap an existing one.
    pub fn add_merge(&mut self, range: CellRange) {
        let at = self.merges.binary_search(&range).unwrap_or_else(|i| i);
        self.merges.insert(at, range);
    }

    /// Remove every merge that intersects `range`, returning the removed regions.
    pub fn remove_merges_overlapping(&mut self, range: &CellRange) -> Vec<CellRange> {
        let mut removed = Vec::new();
        self.merges.retain(|m| {
            if m.overlaps(range) {
                removed.push(*m);
                false
            } else {
                true
            }
        });
        removed
    }

    // =========================================================================
    // Formats
    // =========================================================================

    /// True if the range lies inside the sheet's dimensions.
    pub fn contains_range(&self, range: &CellRange) -> bool {
        range.is_normalized() && range.end_row < self.rows && range.end_col < self.cols
    }

    /// Replace a cell's format, returning the previous one.
    pub fn set_format(&mut self, row: usize, col: usize, format: CellFormat) -> CellFormat {
        let previous = if format.is_default() {
            self.formats.remove(&(row, col))
        } else {
            self.formats.insert((row, col), format)
        };
        previous.unwrap_or_default()
    }

    pub fn get_style(&self, row: usize, col: usize, attribute: StyleAttribute) -> StyleValue {
        match self.formats.get(&(row, col)) {
            Some(format) => StyleValue::read(attribute, format),
            None => StyleValue::read(attribute, &CellFormat::default()),
        }
    }

    /// Store one style attribute, returning the value it replaced.
    pub fn set_style(&mut self, row: usize, col: usize, value: &StyleValue) -> StyleValue {
        self.update_format(row, col, |format| value.write(format))
    }

    pub fn get_border(&self, row: usize, col: usize, side: BorderSide) -> Option<BorderLine> {
        self.formats
            .get(&(row, col))
            .and_then(|f| f.borders.side(side).cloned())
    }

    /// Set one border side, returning what was there.
    pub fn set_border(&mut self, row: usize, col: usize, side: BorderSide, line: Option<BorderLine>) -> Option<BorderLine> {
        self.update_format(row, col, |format| format.borders.replace(side, line))
    }

    /// Number of cells carrying a non-default format.
    pub fn formatted_cell_count(&self) -> usize {
        self.formats.len()
    }

    fn update_format<T>(&mut self, row: usize, col: usize, f: impl FnOnce(&mut CellFormat) -> T) -> T {
        let format = self.formats.entry((row, col)).or_default();
        let result = f(format);
        if format.is_default() {
            self.formats.remove(&(row, col));
        }
        result
    }
}

/// Sheet names are compared case-insensitively, like Excel.
pub fn normalize_sheet_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// A name is valid if it is non-empty after trimming.
pub fn is_valid_sheet_name(name: &str) -> bool {
    !name.trim().is_empty()
}

// Tuple keys can't be JSON object keys; formats travel as a sorted entry list.
mod format_entries {
    use rustc_hash::FxHashMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::cell::CellFormat;

    #[derive(Serialize, Deserialize)]
    struct Entry {
        row: usize,
        col: usize,
        format: CellFormat,
    }

    pub fn serialize<S: Serializer>(map: &FxHashMap<(usize, usize), CellFormat>, serializer: S) -> Result<S::Ok, S::Error> {
        let mut entries: Vec<Entry> = map
            .iter()
            .map(|(&(row, col), format)| Entry { row, col, format: format.clone() })
            .collect();
        entries.sort_by_key(|e| (e.row, e.col));
        entries.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<FxHashMap<(usize, usize), CellFormat>, D::Error> {
        let entries = Vec::<Entry>::deserialize(deserializer)?;
        Ok(entries
            .into_iter()
            .filter(|e| !e.format.is_default())
            .map(|e| ((e.row, e.col), e.format))
            .collect())
    }
}
