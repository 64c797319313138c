//! Session effect types.
//!
//! Effects are what the session controller hands back to the editor widget
//! after each operation. They describe display changes only; the controller
//! never touches the widget directly.
//!
//! The widget applies effects in order. `AppendEntry` always arrives before
//! any effect that refers to the appended range.

use crate::range::TextRange;
use crate::session::Readiness;
use crate::style::{ParagraphStyle, StyleSpan};
use crate::transcript::EntryKind;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEffect {
    /// A new entry was appended to the transcript.
    AppendEntry {
        kind: EntryKind,
        range: TextRange,
        text: String,
        /// Spans relative to `range`.
        spans: Vec<StyleSpan>,
        paragraph: ParagraphStyle,
    },

    /// Empty the live input after a submission.
    ClearInput,

    /// Replace the live input and place the cursor.
    SetInput { text: String, cursor: usize },

    /// Show a recalled history entry: highlight `range` in the transcript,
    /// scroll it into view and load `text` into the input.
    Recall { range: TextRange, text: String },

    /// Scroll the transcript to its last character.
    ScrollToEnd,

    /// The editing-assist mode changed.
    ReadinessChanged(Readiness),
}
