//! Toolbar-level operations.
//!
//! Each call reduces to one or more primitive actions and is invoked as a
//! single command, so one undo reverts the whole operation.

use std::str::FromStr;

use tabula_core::{CellRange, Selection};
use tabula_engine::cell::{Alignment, BorderLine, BorderSide, NumberFormat, TextOverflow, TextRotation, VerticalAlignment};
use tabula_engine::style::StyleValue;
use tabula_engine::SheetId;

use crate::action_data::ActionData;
use crate::command::{Command, CommandHandle};
use crate::document::Document;
use crate::error::CommandError;

pub struct Freeze<'a> {
    doc: &'a mut Document,
    sheet_id: SheetId,
}

impl<'a> Freeze<'a> {
    pub(crate) fn new(doc: &'a mut Document, sheet_id: SheetId) -> Self {
        Self { doc, sheet_id }
    }

    pub fn set_frozen_rows(self, count: i64) -> Result<CommandHandle, CommandError> {
        self.doc.submit(ActionData::set_frozen_rows(self.sheet_id, count))
    }

    pub fn set_frozen_columns(self, count: i64) -> Result<CommandHandle, CommandError> {
        self.doc.submit(ActionData::set_frozen_columns(self.sheet_id, count))
    }
}

/// How `RangeOps::merge` splits the active range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// One merge covering the whole range.
    All,
    /// One merge per column.
    Vertical,
    /// One merge per row.
    Horizontal,
    /// Break apart every merge in the range.
    Cancel,
}

impl FromStr for MergeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(MergeMode::All),
            "vertical" => Ok(MergeMode::Vertical),
            "horizontal" => Ok(MergeMode::Horizontal),
            "cancel" => Ok(MergeMode::Cancel),
            other => Err(format!("unknown merge mode '{}'", other)),
        }
    }
}

/// Which edges `RangeOps::set_border_by_type` touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderType {
    Top,
    Bottom,
    Left,
    Right,
    /// Clear all four sides of every cell.
    None,
    /// All four sides of every cell.
    All,
    /// The outer edge of the range.
    Outside,
    /// Every edge between cells.
    Inside,
    /// Edges between rows.
    Horizontal,
    /// Edges between columns.
    Vertical,
}

impl FromStr for BorderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "top" => Ok(BorderType::Top),
            "bottom" => Ok(BorderType::Bottom),
            "left" => Ok(BorderType::Left),
            "right" => Ok(BorderType::Right),
            "none" => Ok(BorderType::None),
            "all" => Ok(BorderType::All),
            "outside" => Ok(BorderType::Outside),
            "inside" => Ok(BorderType::Inside),
            "horizontal" => Ok(BorderType::Horizontal),
            "vertical" => Ok(BorderType::Vertical),
            other => Err(format!("unknown border type '{}'", other)),
        }
    }
}

impl BorderType {
    /// The (sub-range, side) pairs this type paints on `range`.
    fn edges(self, range: CellRange) -> Vec<(CellRange, BorderSide)> {
        let r = range;
        let top_row = CellRange::new(r.start_row, r.start_col, r.start_row, r.end_col);
        let bottom_row = CellRange::new(r.end_row, r.start_col, r.end_row, r.end_col);
        let left_col = CellRange::new(r.start_row, r.start_col, r.end_row, r.start_col);
        let right_col = CellRange::new(r.start_row, r.end_col, r.end_row, r.end_col);

        let mut between_rows = Vec::new();
        if r.row_count() > 1 {
            between_rows.push((CellRange::new(r.start_row, r.start_col, r.end_row - 1, r.end_col), BorderSide::Bottom));
            between_rows.push((CellRange::new(r.start_row + 1, r.start_col, r.end_row, r.end_col), BorderSide::Top));
        }
        let mut between_cols = Vec::new();
        if r.col_count() > 1 {
            between_cols.push((CellRange::new(r.start_row, r.start_col, r.end_row, r.end_col - 1), BorderSide::Right));
            between_cols.push((CellRange::new(r.start_row, r.start_col + 1, r.end_row, r.end_col), BorderSide::Left));
        }

        match self {
            BorderType::Top => vec![(top_row, BorderSide::Top)],
            BorderType::Bottom => vec![(bottom_row, BorderSide::Bottom)],
            BorderType::Left => vec![(left_col, BorderSide::Left)],
            BorderType::Right => vec![(right_col, BorderSide::Right)],
            BorderType::None | BorderType::All => BorderSide::ALL.iter().map(|side| (r, *side)).collect(),
            BorderType::Outside => vec![
                (top_row, BorderSide::Top),
                (bottom_row, BorderSide::Bottom),
                (left_col, BorderSide::Left),
                (right_col, BorderSide::Right),
            ],
            BorderType::Inside => between_rows.into_iter().chain(between_cols).collect(),
            BorderType::Horizontal => between_rows,
            BorderType::Vertical => between_cols,
        }
    }
}

/// Formatting operations over a selection on one sheet.
pub struct RangeOps<'a> {
    doc: &'a mut Document,
    sheet_id: SheetId,
    selection: Selection,
}

impl<'a> RangeOps<'a> {
    pub(crate) fn new(doc: &'a mut Document, sheet_id: SheetId, selection: Selection) -> Self {
        Self { doc, sheet_id, selection }
    }

    /// Set one style attribute on every range of the selection.
    pub fn set_style(self, label: &str, value: StyleValue) -> Result<CommandHandle, CommandError> {
        let actions = self
            .selection
            .ranges()
            .iter()
            .map(|range| ActionData::set_range_style(self.sheet_id, *range, value.clone()))
            .collect();
        self.doc.invoke(Command::compound(label, actions))
    }

    pub fn set_font_color(self, color: Option<&str>) -> Result<CommandHandle, CommandError> {
        self.set_style("Font color", StyleValue::FontColor(color.map(str::to_string)))
    }

    pub fn set_background(self, color: Option<&str>) -> Result<CommandHandle, CommandError> {
        self.set_style("Background", StyleValue::Background(color.map(str::to_string)))
    }

    pub fn set_font_size(self, size: Option<f32>) -> Result<CommandHandle, CommandError> {
        self.set_style("Font size", StyleValue::FontSize(size))
    }

    pub fn set_font_family(self, family: Option<&str>) -> Result<CommandHandle, CommandError> {
        self.set_style("Font", StyleValue::FontFamily(family.map(str::to_string)))
    }

    pub fn set_bold(self, on: bool) -> Result<CommandHandle, CommandError> {
        self.set_style("Bold", StyleValue::Bold(on))
    }

    pub fn set_italic(self, on: bool) -> Result<CommandHandle, CommandError> {
        self.set_style("Italic", StyleValue::Italic(on))
    }

    pub fn set_strikethrough(self, on: bool) -> Result<CommandHandle, CommandError> {
        self.set_style("Strikethrough", StyleValue::Strikethrough(on))
    }

    pub fn set_underline(self, on: bool) -> Result<CommandHandle, CommandError> {
        self.set_style("Underline", StyleValue::Underline(on))
    }

    pub fn set_horizontal_alignment(self, alignment: Alignment) -> Result<CommandHandle, CommandError> {
        self.set_style("Align", StyleValue::HorizontalAlignment(alignment))
    }

    pub fn set_vertical_alignment(self, alignment: VerticalAlignment) -> Result<CommandHandle, CommandError> {
        self.set_style("Vertical align", StyleValue::VerticalAlignment(alignment))
    }

    pub fn set_wrap_strategy(self, strategy: TextOverflow) -> Result<CommandHandle, CommandError> {
        self.set_style("Wrap", StyleValue::WrapStrategy(strategy))
    }

    /// Degrees in [-90, 90]; 0 clears the rotation.
    pub fn set_text_rotation(self, angle: i16) -> Result<CommandHandle, CommandError> {
        let rotation = if angle == 0 { TextRotation::None } else { TextRotation::Angle(angle) };
        self.set_style("Rotate text", StyleValue::TextRotation(rotation))
    }

    pub fn set_vertical_text(self) -> Result<CommandHandle, CommandError> {
        self.set_style("Vertical text", StyleValue::TextRotation(TextRotation::Vertical))
    }

    pub fn set_number_format(self, format: NumberFormat) -> Result<CommandHandle, CommandError> {
        self.set_style("Number format", StyleValue::NumberFormat(format))
    }

    /// Merge the active range. Existing merges it touches are broken first,
    /// in the same command.
    ///
    /// Single-cell pieces are never merged. When there is nothing to break and
    /// nothing to merge, the call fails with `EmptyCommand` and history is
    /// left alone.
    pub fn merge(self, mode: MergeMode) -> Result<CommandHandle, CommandError> {
        let active = self.selection.active_range();
        let merges: Vec<CellRange> = match mode {
            MergeMode::All => vec![active],
            MergeMode::Vertical => active.columns().collect(),
            MergeMode::Horizontal => active.rows().collect(),
            MergeMode::Cancel => Vec::new(),
        };
        let merges: Vec<CellRange> = merges.into_iter().filter(|r| !r.is_single()).collect();

        // An unknown sheet keeps the break step so validation reports it.
        let has_merges = self
            .doc
            .workbook()
            .sheet_by_id(self.sheet_id)
            .map_or(true, |sheet| sheet.merge_overlapping(&active).is_some());

        let mut command = Command::compound("Merge cells", Vec::new());
        if has_merges {
            command.push(ActionData::remove_merges(self.sheet_id, vec![active]));
        }
        if !merges.is_empty() {
            command.push(ActionData::add_merges(self.sheet_id, merges));
        }
        self.doc.invoke(command)
    }

    pub fn merge_vertically(self) -> Result<CommandHandle, CommandError> {
        self.merge(MergeMode::Vertical)
    }

    pub fn merge_across(self) -> Result<CommandHandle, CommandError> {
        self.merge(MergeMode::Horizontal)
    }

    pub fn break_apart(self) -> Result<CommandHandle, CommandError> {
        self.merge(MergeMode::Cancel)
    }

    /// Paint (or clear, with `line: None`) the borders `border_type` selects on
    /// every range of the selection. `BorderType::None` always clears.
    pub fn set_border_by_type(self, border_type: BorderType, line: Option<BorderLine>) -> Result<CommandHandle, CommandError> {
        let line = if border_type == BorderType::None { None } else { line };
        let actions = self
            .selection
            .ranges()
            .iter()
            .flat_map(|range| border_type.edges(*range))
            .map(|(range, side)| ActionData::set_border(self.sheet_id, range, side, line.clone()))
            .collect();
        self.doc.invoke(Command::compound("Borders", actions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_engine::cell::BorderStyle;
    use tabula_engine::style::StyleAttribute;
    use tabula_engine::Workbook;

    use crate::error::ValidationError;

    const SHEET: SheetId = SheetId(1);

    fn a1(s: &str) -> CellRange {
        CellRange::parse_a1(s).unwrap()
    }

    #[test]
    fn test_style_over_multi_range_selection_is_one_entry() {
        let mut doc = Document::new(Workbook::new());
        let selection = Selection::from_ranges(vec![a1("A1:B2"), a1("D4")]).unwrap();
        doc.range(SHEET, selection).set_bold(true).unwrap();

        let sheet = doc.workbook().sheet_by_id(SHEET).unwrap();
        assert_eq!(sheet.formatted_cell_count(), 5);
        assert_eq!(sheet.get_style(3, 3, StyleAttribute::Bold), StyleValue::Bold(true));
        assert_eq!(doc.commands().undo_depth(), 1);

        doc.undo().unwrap();
        assert_eq!(doc.workbook().sheet_by_id(SHEET).unwrap().formatted_cell_count(), 0);
    }

    #[test]
    fn test_text_rotation_zero_clears() {
        let mut doc = Document::new(Workbook::new());
        doc.range(SHEET, a1("A1")).set_text_rotation(45).unwrap();
        doc.range(SHEET, a1("A1")).set_text_rotation(0).unwrap();
        assert_eq!(doc.workbook().sheet_by_id(SHEET).unwrap().formatted_cell_count(), 0);

        let err = doc.range(SHEET, a1("A1")).set_text_rotation(120).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_merge_modes() {
        let mut doc = Document::new(Workbook::new());
        doc.range(SHEET, a1("A1:C2")).merge_vertically().unwrap();
        assert_eq!(
            doc.workbook().sheet_by_id(SHEET).unwrap().merges(),
            &[a1("A1:A2"), a1("B1:B2"), a1("C1:C2")]
        );

        // Re-merging replaces the column merges in one entry.
        doc.range(SHEET, a1("A1:C2")).merge(MergeMode::All).unwrap();
        assert_eq!(doc.workbook().sheet_by_id(SHEET).unwrap().merges(), &[a1("A1:C2")]);

        doc.undo().unwrap();
        assert_eq!(doc.workbook().sheet_by_id(SHEET).unwrap().merges().len(), 3);

        doc.range(SHEET, a1("B1")).break_apart().unwrap();
        assert_eq!(doc.workbook().sheet_by_id(SHEET).unwrap().merges(), &[a1("A1:A2"), a1("C1:C2")]);
    }

    #[test]
    fn test_merge_across_skips_single_cell_rows() {
        let mut doc = Document::new(Workbook::new());
        let err = doc.range(SHEET, a1("A1:A3")).merge_across().unwrap_err();
        assert_eq!(err, CommandError::Validation(ValidationError::EmptyCommand));
        assert!(doc.workbook().sheet_by_id(SHEET).unwrap().merges().is_empty());
        assert!(!doc.can_undo());
    }

    #[test]
    fn test_merge_single_cell_only_breaks_existing() {
        let mut doc = Document::new(Workbook::new());
        doc.range(SHEET, a1("A1:B2")).merge(MergeMode::All).unwrap();

        doc.range(SHEET, a1("A1")).merge(MergeMode::All).unwrap();
        assert!(doc.workbook().sheet_by_id(SHEET).unwrap().merges().is_empty());

        doc.undo().unwrap();
        assert_eq!(doc.workbook().sheet_by_id(SHEET).unwrap().merges(), &[a1("A1:B2")]);
    }

    #[test]
    fn test_break_apart_without_merges_keeps_redo() {
        let mut doc = Document::new(Workbook::new());
        doc.freeze(SHEET).set_frozen_rows(1).unwrap();
        doc.undo().unwrap();

        let err = doc.range(SHEET, a1("C3:D4")).break_apart().unwrap_err();
        assert!(err.is_validation());
        assert!(doc.can_redo());
        assert!(!doc.can_undo());
    }

    #[test]
    fn test_outside_border() {
        let mut doc = Document::new(Workbook::new());
        let line = BorderLine::new(BorderStyle::Medium, "#000");
        doc.range(SHEET, a1("B2:D4")).set_border_by_type(BorderType::Outside, Some(line.clone())).unwrap();

        let sheet = doc.workbook().sheet_by_id(SHEET).unwrap();
        assert_eq!(sheet.get_border(1, 2, BorderSide::Top), Some(line.clone()));
        assert_eq!(sheet.get_border(3, 3, BorderSide::Right), Some(line.clone()));
        assert_eq!(sheet.get_border(2, 2, BorderSide::Top), None);
        // Centre cell untouched, 8 edge cells formatted.
        assert_eq!(sheet.formatted_cell_count(), 8);
    }

    #[test]
    fn test_inside_border_on_single_cell_is_rejected() {
        let mut doc = Document::new(Workbook::new());
        let line = BorderLine::new(BorderStyle::Thin, "#000");
        let err = doc.range(SHEET, a1("A1")).set_border_by_type(BorderType::Inside, Some(line)).unwrap_err();
        assert!(err.is_validation());
        assert!(!doc.can_undo());
    }

    #[test]
    fn test_none_border_clears_everything() {
        let mut doc = Document::new(Workbook::new());
        let line = BorderLine::new(BorderStyle::Thin, "#abc");
        doc.range(SHEET, a1("A1:B2")).set_border_by_type(BorderType::All, Some(line.clone())).unwrap();
        doc.range(SHEET, a1("A1:B2")).set_border_by_type(BorderType::None, Some(line)).unwrap();
        assert_eq!(doc.workbook().sheet_by_id(SHEET).unwrap().formatted_cell_count(), 0);
    }

    #[test]
    fn test_parse_modes() {
        assert_eq!("Vertical".parse::<MergeMode>(), Ok(MergeMode::Vertical));
        assert_eq!("outside".parse::<BorderType>(), Ok(BorderType::Outside));
        assert!("diagonal".parse::<BorderType>().is_err());
    }
}
