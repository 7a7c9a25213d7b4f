use serde::{Deserialize, Serialize};

/// Horizontal text alignment
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Vertical text alignment
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VerticalAlignment {
    Top,
    #[default]
    Middle,
    Bottom,
}

/// Text overflow behavior (the toolbar's "wrap strategy")
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TextOverflow {
    #[default]
    Clip,       // Text is clipped at cell boundary
    Wrap,       // Text wraps to multiple lines within the cell
    Overflow,   // Text overflows into adjacent empty cells
}

/// Number format type
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NumberFormat {
    #[default]
    General,
    Number { decimals: u8 },
    Currency { decimals: u8 },
    Percent { decimals: u8 },
}

/// Text rotation: an angle in degrees, or stacked vertical text
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TextRotation {
    #[default]
    None,
    /// Degrees, -90..=90. Positive rotates counter-clockwise.
    Angle(i16),
    Vertical,
}

/// Line style of a cell border
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BorderStyle {
    #[default]
    Thin,
    Hair,
    Dotted,
    Dashed,
    DashDot,
    DashDotDot,
    Double,
    Medium,
    MediumDashed,
    MediumDashDot,
    MediumDashDotDot,
    SlantDashDot,
    Thick,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BorderLine {
    pub style: BorderStyle,
    /// `#rgb` or `#rrggbb`
    pub color: String,
}

impl BorderLine {
    pub fn new(style: BorderStyle, color: impl Into<String>) -> Self {
        Self { style, color: color.into() }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BorderSide {
    Top,
    Bottom,
    Left,
    Right,
}

impl BorderSide {
    pub const ALL: [BorderSide; 4] = [BorderSide::Top, BorderSide::Bottom, BorderSide::Left, BorderSide::Right];
}

/// The four border sides of one cell. `None` = no border drawn.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CellBorders {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<BorderLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<BorderLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<BorderLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<BorderLine>,
}

impl CellBorders {
    pub fn side(&self, side: BorderSide) -> Option<&BorderLine> {
        match side {
            BorderSide::Top => self.top.as_ref(),
            BorderSide::Bottom => self.bottom.as_ref(),
            BorderSide::Left => self.left.as_ref(),
            BorderSide::Right => self.right.as_ref(),
        }
    }

    /// Replace one side, returning what was there.
    pub fn replace(&mut self, side: BorderSide, line: Option<BorderLine>) -> Option<BorderLine> {
        let slot = match side {
            BorderSide::Top => &mut self.top,
            BorderSide::Bottom => &mut self.bottom,
            BorderSide::Left => &mut self.left,
            BorderSide::Right => &mut self.right,
        };
        std::mem::replace(slot, line)
    }
}

/// Cell formatting options
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CellFormat {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub alignment: Alignment,
    pub vertical_alignment: VerticalAlignment,
    pub text_overflow: TextOverflow,
    pub number_format: NumberFormat,
    pub text_rotation: TextRotation,
    pub font_family: Option<String>,  // None = inherit from settings
    pub font_size: Option<f32>,       // points, None = inherit
    pub font_color: Option<String>,
    pub background: Option<String>,
    pub borders: CellBorders,
}

impl CellFormat {
    pub fn is_default(&self) -> bool {
        *self == CellFormat::default()
    }
}

/// Accepts `#rgb` and `#rrggbb` (case-insensitive).
pub fn is_valid_color(color: &str) -> bool {
    match color.strip_prefix('#') {
        Some(hex) => (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_format_defaults() {
        let format = CellFormat::default();
        assert!(!format.bold);
        assert!(!format.italic);
        assert!(!format.underline);
        assert!(!format.strikethrough);
        assert_eq!(format.alignment, Alignment::Left);
        assert_eq!(format.vertical_alignment, VerticalAlignment::Middle);
        assert_eq!(format.text_overflow, TextOverflow::Clip);
        assert_eq!(format.number_format, NumberFormat::General);
        assert_eq!(format.text_rotation, TextRotation::None);
        assert_eq!(format.borders, CellBorders::default());
        assert!(format.is_default());
    }

    #[test]
    fn test_border_replace_returns_previous() {
        let mut borders = CellBorders::default();
        let line = BorderLine::new(BorderStyle::Thick, "#000");

        assert_eq!(borders.replace(BorderSide::Left, Some(line.clone())), None);
        assert_eq!(borders.side(BorderSide::Left), Some(&line));
        assert_eq!(borders.replace(BorderSide::Left, None), Some(line));
        assert_eq!(borders, CellBorders::default());
    }

    #[test]
    fn test_color_validation() {
        assert!(is_valid_color("#000"));
        assert!(is_valid_color("#1a2B3c"));
        assert!(!is_valid_color("000"));
        assert!(!is_valid_color("#12345"));
        assert!(!is_valid_color("#ggg"));
        assert!(!is_valid_color("red"));
    }

    #[test]
    fn test_empty_borders_skip_serializing() {
        let json = serde_json::to_string(&CellBorders::default()).unwrap();
        assert_eq!(json, "{}");
    }
}
