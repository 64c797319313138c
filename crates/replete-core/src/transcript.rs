//! Append-only transcript of everything shown in the output view.
//!
//! Every entry gets a character range at append time. Ranges are strictly
//! increasing and never move, so the history index can hold them as stable
//! handles into the transcript instead of copying text around.

use crate::range::TextRange;
use crate::style::{ParagraphStyle, StyleSpan};

/// What produced a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Source text submitted by the user.
    Input,
    /// Text printed by the engine.
    Output,
    /// The one-time startup banner.
    Masthead,
}

/// A single appended block of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptEntry {
    pub kind: EntryKind,
    pub range: TextRange,
    /// Rendered text, already free of control tokens.
    pub text: String,
    /// Color spans relative to `range`, in insertion order.
    pub spans: Vec<StyleSpan>,
    pub paragraph: ParagraphStyle,
}

/// The append-only store.
#[derive(Debug, Default)]
pub struct TranscriptBuffer {
    entries: Vec<TranscriptEntry>,
    total_len: usize,
}

impl TranscriptBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `text` at the current end and returns its range.
    ///
    /// Zero-length text yields an empty range at the end and stores nothing,
    /// which keeps stored ranges strictly increasing.
    pub fn append(
        &mut self,
        kind: EntryKind,
        text: impl Into<String>,
        spans: Vec<StyleSpan>,
        paragraph: ParagraphStyle,
    ) -> TextRange {
        let text = text.into();
        let len = text.chars().count();
        let range = TextRange::new(self.total_len, len);
        if len == 0 {
            return range;
        }

        debug_assert!(spans.iter().all(|s| s.range.end() <= len));
        self.entries.push(TranscriptEntry {
            kind,
            range,
            text,
            spans,
            paragraph,
        });
        self.total_len += len;
        range
    }

    /// Total number of characters ever appended.
    pub fn total_len(&self) -> usize {
        self.total_len
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Returns the entry whose range contains `offset`.
    pub fn entry_at(&self, offset: usize) -> Option<&TranscriptEntry> {
        let idx = self.first_ending_after(offset);
        self.entries.get(idx).filter(|e| e.range.contains(offset))
    }

    /// Returns the text covered by `range`, or `None` if it reaches past the end.
    pub fn substring(&self, range: TextRange) -> Option<String> {
        if range.end() > self.total_len {
            return None;
        }

        let mut out = String::new();
        for entry in self.overlapping(range) {
            let from = range.start.max(entry.range.start) - entry.range.start;
            let to = range.end().min(entry.range.end()) - entry.range.start;
            out.extend(entry.text.chars().skip(from).take(to - from));
        }
        Some(out)
    }

    /// Returns the color spans intersecting `range`, clipped to it and in
    /// absolute transcript offsets. `None` if the range reaches past the end.
    pub fn styles_in(&self, range: TextRange) -> Option<Vec<StyleSpan>> {
        if range.end() > self.total_len {
            return None;
        }

        let spans = self
            .overlapping(range)
            .flat_map(|entry| {
                entry
                    .spans
                    .iter()
                    .map(|span| StyleSpan::new(span.range.offset_by(entry.range.start), span.color))
            })
            .filter(|span| span.range.intersects(&range))
            .map(|span| {
                let start = span.range.start.max(range.start);
                let end = span.range.end().min(range.end());
                StyleSpan::new(TextRange::new(start, end - start), span.color)
            })
            .collect();
        Some(spans)
    }

    fn first_ending_after(&self, offset: usize) -> usize {
        self.entries.partition_point(|e| e.range.end() <= offset)
    }

    fn overlapping(&self, range: TextRange) -> impl Iterator<Item = &TranscriptEntry> {
        self.entries[self.first_ending_after(range.start)..]
            .iter()
            .take_while(move |e| e.range.start < range.end())
    }
}
