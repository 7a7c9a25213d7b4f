//! Single-attribute style values.
//!
//! A `StyleValue` names one `CellFormat` attribute together with the value to
//! store in it. Style actions carry these instead of whole formats so that
//! setting the font colour on a range leaves every other attribute alone.

use serde::{Deserialize, Serialize};

use crate::cell::{Alignment, CellFormat, NumberFormat, TextOverflow, TextRotation, VerticalAlignment, is_valid_color};

/// Largest font size accepted, in points.
pub const MAX_FONT_SIZE: f32 = 409.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleAttribute {
    FontColor,
    Background,
    FontSize,
    FontFamily,
    Bold,
    Italic,
    Underline,
    Strikethrough,
    HorizontalAlignment,
    VerticalAlignment,
    WrapStrategy,
    TextRotation,
    NumberFormat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "attribute", content = "value", rename_all = "snake_case")]
pub enum StyleValue {
    FontColor(Option<String>),
    Background(Option<String>),
    FontSize(Option<f32>),
    FontFamily(Option<String>),
    Bold(bool),
    Italic(bool),
    Underline(bool),
    Strikethrough(bool),
    HorizontalAlignment(Alignment),
    VerticalAlignment(VerticalAlignment),
    WrapStrategy(TextOverflow),
    TextRotation(TextRotation),
    NumberFormat(NumberFormat),
}

impl StyleValue {
    pub fn attribute(&self) -> StyleAttribute {
        match self {
            StyleValue::FontColor(_) => StyleAttribute::FontColor,
            StyleValue::Background(_) => StyleAttribute::Background,
            StyleValue::FontSize(_) => StyleAttribute::FontSize,
            StyleValue::FontFamily(_) => StyleAttribute::FontFamily,
            StyleValue::Bold(_) => StyleAttribute::Bold,
            StyleValue::Italic(_) => StyleAttribute::Italic,
            StyleValue::Underline(_) => StyleAttribute::Underline,
            StyleValue::Strikethrough(_) => StyleAttribute::Strikethrough,
            StyleValue::HorizontalAlignment(_) => StyleAttribute::HorizontalAlignment,
            StyleValue::VerticalAlignment(_) => StyleAttribute::VerticalAlignment,
            StyleValue::WrapStrategy(_) => StyleAttribute::WrapStrategy,
            StyleValue::TextRotation(_) => StyleAttribute::TextRotation,
            StyleValue::NumberFormat(_) => StyleAttribute::NumberFormat,
        }
    }

    /// Read the current value of `attribute` out of a format.
    pub fn read(attribute: StyleAttribute, format: &CellFormat) -> StyleValue {
        match attribute {
            StyleAttribute::FontColor => StyleValue::FontColor(format.font_color.clone()),
            StyleAttribute::Background => StyleValue::Background(format.background.clone()),
            StyleAttribute::FontSize => StyleValue::FontSize(format.font_size),
            StyleAttribute::FontFamily => StyleValue::FontFamily(format.font_family.clone()),
            StyleAttribute::Bold => StyleValue::Bold(format.bold),
            StyleAttribute::Italic => StyleValue::Italic(format.italic),
            StyleAttribute::Underline => StyleValue::Underline(format.underline),
            StyleAttribute::Strikethrough => StyleValue::Strikethrough(format.strikethrough),
            StyleAttribute::HorizontalAlignment => StyleValue::HorizontalAlignment(format.alignment),
            StyleAttribute::VerticalAlignment => StyleValue::VerticalAlignment(format.vertical_alignment),
            StyleAttribute::WrapStrategy => StyleValue::WrapStrategy(format.text_overflow),
            StyleAttribute::TextRotation => StyleValue::TextRotation(format.text_rotation),
            StyleAttribute::NumberFormat => StyleValue::NumberFormat(format.number_format),
        }
    }

    /// Store this value into `format`, returning the value it replaced.
    pub fn write(&self, format: &mut CellFormat) -> StyleValue {
        let previous = StyleValue::read(self.attribute(), format);
        match self {
            StyleValue::FontColor(v) => format.font_color = v.clone(),
            StyleValue::Background(v) => format.background = v.clone(),
            StyleValue::FontSize(v) => format.font_size = *v,
            StyleValue::FontFamily(v) => format.font_family = v.clone(),
            StyleValue::Bold(v) => format.bold = *v,
            StyleValue::Italic(v) => format.italic = *v,
            StyleValue::Underline(v) => format.underline = *v,
            StyleValue::Strikethrough(v) => format.strikethrough = *v,
            StyleValue::HorizontalAlignment(v) => format.alignment = *v,
            StyleValue::VerticalAlignment(v) => format.vertical_alignment = *v,
            StyleValue::WrapStrategy(v) => format.text_overflow = *v,
            StyleValue::TextRotation(v) => format.text_rotation = *v,
            StyleValue::NumberFormat(v) => format.number_format = *v,
        }
        previous
    }

    /// Describe why this value can't be stored, if it can't.
    pub fn check(&self) -> Result<(), String> {
        match self {
            StyleValue::FontColor(Some(c)) | StyleValue::Background(Some(c)) if !is_valid_color(c) => {
                Err(format!("invalid color '{}'", c))
            }
            StyleValue::FontSize(Some(size)) if !(*size > 0.0 && *size <= MAX_FONT_SIZE) => {
                Err(format!("font size {} outside (0, {}]", size, MAX_FONT_SIZE))
            }
            StyleValue::FontFamily(Some(family)) if family.trim().is_empty() => {
                Err("font family cannot be blank".to_string())
            }
            StyleValue::TextRotation(TextRotation::Angle(angle)) if !(-90..=90).contains(angle) => {
                Err(format!("rotation {} outside [-90, 90]", angle))
            }
            _ => Ok(()),
        }
    }
}
