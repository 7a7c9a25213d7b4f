use serde::{Deserialize, Serialize};

use crate::sheet::{is_valid_sheet_name, normalize_sheet_name, Sheet, SheetId};

/// Default grid dimensions for new sheets.
pub const DEFAULT_ROWS: usize = 65536;
pub const DEFAULT_COLS: usize = 256;

/// Raised when a sheet id no longer resolves to a live sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("sheet {0} not found")]
pub struct SheetNotFound(pub SheetId);

/// A workbook containing multiple sheets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workbook {
    sheets: Vec<Sheet>,
    active_sheet: usize,
    /// Next ID to assign to a new sheet. Monotonically increasing, never reused.
    #[serde(default = "default_next_sheet_id")]
    next_sheet_id: u64,
}

fn default_next_sheet_id() -> u64 {
    1
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}

impl Workbook {
    /// Create a new workbook with one default sheet
    pub fn new() -> Self {
        let sheet = Sheet::new(SheetId(1), DEFAULT_ROWS, DEFAULT_COLS);
        Self {
            sheets: vec![sheet],
            active_sheet: 0,
            next_sheet_id: 2, // Next ID will be 2
        }
    }

    /// Generate a new unique SheetId (monotonically increasing, never reused)
    fn generate_sheet_id(&mut self) -> SheetId {
        let id = SheetId(self.next_sheet_id);
        self.next_sheet_id += 1;
        id
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Get all sheets (for serialization)
    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn active_sheet_id(&self) -> Option<SheetId> {
        self.sheets.get(self.active_sheet).map(|s| s.id)
    }

    /// Set the active sheet by ID
    pub fn set_active_sheet(&mut self, id: SheetId) -> bool {
        match self.idx_for_sheet_id(id) {
            Some(idx) => {
                self.active_sheet = idx;
                true
            }
            None => false,
        }
    }

    /// Add a new sheet with a specific name, returning its ID.
    /// Returns None if name is invalid or already exists (case-insensitive).
    pub fn add_sheet_named(&mut self, name: &str) -> Option<SheetId> {
        if !is_valid_sheet_name(name) || self.sheet_name_exists(name) {
            return None;
        }
        let id = self.generate_sheet_id();
        let mut sheet = Sheet::new(id, DEFAULT_ROWS, DEFAULT_COLS);
        sheet.set_name(name);
        self.sheets.push(sheet);
        Some(id)
    }

    /// Check if a sheet name already exists (case-insensitive)
    pub fn sheet_name_exists(&self, name: &str) -> bool {
        let key = normalize_sheet_name(name);
        self.sheets.iter().any(|s| normalize_sheet_name(s.name()) == key)
    }

    /// Delete a sheet by ID. Returns the removed sheet.
    /// The last remaining sheet can't be deleted.
    pub fn delete_sheet(&mut self, id: SheetId) -> Option<Sheet> {
        if self.sheets.len() <= 1 {
            return None;
        }
        let index = self.idx_for_sheet_id(id)?;
        let removed = self.sheets.remove(index);

        // Adjust active sheet if needed
        if self.active_sheet >= self.sheets.len() {
            self.active_sheet = self.sheets.len() - 1;
        } else if self.active_sheet > index {
            self.active_sheet -= 1;
        }

        Some(removed)
    }

    // =========================================================================
    // Sheet ID-based Access
    // =========================================================================

    /// Get a sheet's index by its ID
    pub fn idx_for_sheet_id(&self, id: SheetId) -> Option<usize> {
        self.sheets.iter().position(|s| s.id == id)
    }

    pub fn sheet_by_id(&self, id: SheetId) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.id == id)
    }

    pub fn sheet_by_id_mut(&mut self, id: SheetId) -> Option<&mut Sheet> {
        self.sheets.iter_mut().find(|s| s.id == id)
    }

    /// Find a sheet by name (case-insensitive). With duplicate names the
    /// first one in tab order wins.
    pub fn sheet_by_name(&self, name: &str) -> Option<&Sheet> {
        let key = normalize_sheet_name(name);
        self.sheets.iter().find(|s| normalize_sheet_name(s.name()) == key)
    }

    /// Resolve a sheet for mutation. Actions call this at the start of every
    /// apply, so a deleted or rebuilt sheet is never mutated through a stale handle.
    pub fn resolve_sheet(&mut self, id: SheetId) -> Result<&mut Sheet, SheetNotFound> {
        self.sheet_by_id_mut(id).ok_or(SheetNotFound(id))
    }

    pub fn contains_sheet(&self, id: SheetId) -> bool {
        self.idx_for_sheet_id(id).is_some()
    }
}
