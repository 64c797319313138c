//! Semantic styles for transcript text (UI-agnostic).
//!
//! The session only decides which character ranges carry which color tag.
//! Turning a tag into pixels or terminal attributes is the widget's job.

use crate::range::TextRange;

/// Semantic color identifiers.
///
/// Translated to real colors by the renderer via [`ColorTag::rgb`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorTag {
    /// Default foreground, also used for unrecognized control codes.
    #[default]
    Black,
    Blue,
    Green,
    Magenta,
    Red,
    /// Dark gray used for echoed input and the masthead.
    Muted,
}

impl ColorTag {
    /// Maps a single SGR parameter to a tag. Only the four colors emitted by
    /// the engine's printer are recognized.
    pub fn from_sgr(code: u16) -> Option<Self> {
        match code {
            31 => Some(ColorTag::Red),
            32 => Some(ColorTag::Green),
            34 => Some(ColorTag::Blue),
            35 => Some(ColorTag::Magenta),
            _ => None,
        }
    }

    /// Display color as 8-bit RGB.
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            ColorTag::Black => (0, 0, 0),
            ColorTag::Blue => (0, 0, 255),
            ColorTag::Green => (0, 191, 0),
            ColorTag::Magenta => (191, 0, 191),
            ColorTag::Red => (255, 84, 84),
            ColorTag::Muted => (85, 85, 85),
        }
    }
}

/// A color tag applied over a character range.
///
/// Inside an entry the range is relative to the entry's text; spans handed
/// out by [`crate::transcript::TranscriptBuffer::styles_in`] are absolute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleSpan {
    pub range: TextRange,
    pub color: ColorTag,
}

impl StyleSpan {
    pub fn new(range: TextRange, color: ColorTag) -> Self {
        Self { range, color }
    }
}

/// Paragraph-level display rule for a whole entry.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ParagraphStyle {
    /// Vertical space before the entry, in points.
    pub spacing_before: f32,
    /// Foreground applied under the entry's own spans, if any.
    pub foreground: Option<ColorTag>,
}
