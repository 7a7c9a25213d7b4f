//! Rectangular cell ranges.
//!
//! Rows and columns are 0-indexed and both ends are inclusive. The A1 form
//! (`B2:D4`) is only used at the edges (CLI, display); everything inside the
//! workspace works on indices.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A rectangular range of cells, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRange {
    /// Start row (0-indexed).
    pub start_row: usize,
    /// Start column (0-indexed).
    pub start_col: usize,
    /// End row (inclusive, 0-indexed).
    pub end_row: usize,
    /// End column (inclusive, 0-indexed).
    pub end_col: usize,
}

impl CellRange {
    /// Create a new range, normalizing so start <= end.
    pub fn new(r1: usize, c1: usize, r2: usize, c2: usize) -> Self {
        Self {
            start_row: r1.min(r2),
            start_col: c1.min(c2),
            end_row: r1.max(r2),
            end_col: c1.max(c2),
        }
    }

    /// Create a single-cell range.
    pub fn single(row: usize, col: usize) -> Self {
        Self::new(row, col, row, col)
    }

    /// Ranges built from struct literals or deserialized input may be reversed.
    pub fn is_normalized(&self) -> bool {
        self.start_row <= self.end_row && self.start_col <= self.end_col
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        row >= self.start_row && row <= self.end_row
            && col >= self.start_col && col <= self.end_col
    }

    /// True if `other` lies entirely inside this range.
    pub fn contains_range(&self, other: &CellRange) -> bool {
        self.contains(other.start_row, other.start_col) && self.contains(other.end_row, other.end_col)
    }

    /// Check if this range overlaps with another range.
    pub fn overlaps(&self, other: &CellRange) -> bool {
        !(self.end_row < other.start_row
            || self.start_row > other.end_row
            || self.end_col < other.start_col
            || self.start_col > other.end_col)
    }

    pub fn row_count(&self) -> usize {
        self.end_row - self.start_row + 1
    }

    pub fn col_count(&self) -> usize {
        self.end_col - self.start_col + 1
    }

    /// Number of cells in this range.
    pub fn cell_count(&self) -> usize {
        self.row_count() * self.col_count()
    }

    pub fn is_single(&self) -> bool {
        self.start_row == self.end_row && self.start_col == self.end_col
    }

    /// Iterate over all cells in this range (row-major order).
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> {
        let (start_col, end_col) = (self.start_col, self.end_col);
        (self.start_row..=self.end_row).flat_map(move |r| (start_col..=end_col).map(move |c| (r, c)))
    }

    /// One sub-range per row, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = CellRange> {
        let (start_col, end_col) = (self.start_col, self.end_col);
        (self.start_row..=self.end_row).map(move |r| CellRange::new(r, start_col, r, end_col))
    }

    /// One sub-range per column, left to right.
    pub fn columns(&self) -> impl Iterator<Item = CellRange> {
        let (start_row, end_row) = (self.start_row, self.end_row);
        (self.start_col..=self.end_col).map(move |c| CellRange::new(start_row, c, end_row, c))
    }

    /// Parse A1 notation: `B2`, `B2:D4`, case-insensitive, `$` anchors ignored.
    pub fn parse_a1(input: &str) -> Option<Self> {
        let mut parts = input.trim().splitn(2, ':');
        let (r1, c1) = parse_cell_ref(parts.next()?)?;
        match parts.next() {
            Some(end) => {
                let (r2, c2) = parse_cell_ref(end)?;
                Some(Self::new(r1, c1, r2, c2))
            }
            None => Some(Self::single(r1, c1)),
        }
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", col_to_letters(self.start_col), self.start_row + 1)?;
        if !self.is_single() {
            write!(f, ":{}{}", col_to_letters(self.end_col), self.end_row + 1)?;
        }
        Ok(())
    }
}

impl PartialOrd for CellRange {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellRange {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.start_row, self.start_col, self.end_row, self.end_col)
            .cmp(&(other.start_row, other.start_col, other.end_row, other.end_col))
    }
}

/// Convert 0-based column index to Excel-style letter(s).
pub fn col_to_letters(col: usize) -> String {
    let mut result = String::new();
    let mut n = col;
    loop {
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    result
}

fn parse_cell_ref(cell: &str) -> Option<(usize, usize)> {
    let cell = cell.trim().replace('$', "");
    let split = cell.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = cell.split_at(split);
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    let mut col = 0usize;
    for c in letters.chars() {
        col = col.checked_mul(26)?.checked_add((c.to_ascii_uppercase() as u8 - b'A') as usize + 1)?;
    }
    let row: usize = digits.parse().ok()?;
    if row == 0 {
        return None;
    }
    Some((row - 1, col - 1))
}
