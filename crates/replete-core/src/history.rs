//! Input history for back/forward recall.
//!
//! The index only stores ranges into the transcript. Text is looked up
//! through [`crate::transcript::TranscriptBuffer`] when an entry is recalled.

use crate::range::TextRange;

/// Direction of a history move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Back,
    Forward,
}

/// Submitted-input ranges plus the recall cursor.
///
/// The cursor is `None` only while the history is empty. Every raw change
/// goes through [`HistoryIndex::clamp`], so moving back from the oldest
/// entry stays on it rather than dropping the selection.
#[derive(Debug, Default, Clone)]
pub struct HistoryIndex {
    entries: Vec<TextRange>,
    cursor: Option<usize>,
}

impl HistoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a submitted input and selects it.
    pub fn record_input(&mut self, range: TextRange) {
        self.entries.push(range);
        self.cursor = Self::clamp(self.entries.len() as isize - 1, self.entries.len());
    }

    pub fn move_back(&mut self) {
        self.step(-1);
    }

    pub fn move_forward(&mut self) {
        self.step(1);
    }

    pub fn move_in(&mut self, direction: Direction) {
        match direction {
            Direction::Back => self.move_back(),
            Direction::Forward => self.move_forward(),
        }
    }

    /// Selects the first recorded input whose range contains `offset`.
    ///
    /// Returns false and leaves the cursor alone when nothing matches.
    pub fn select_at(&mut self, offset: usize) -> bool {
        match self.entries.iter().position(|r| r.contains(offset)) {
            Some(idx) => {
                self.cursor = Some(idx);
                true
            }
            None => false,
        }
    }

    /// Range of the selected input, if any.
    pub fn current_range(&self) -> Option<TextRange> {
        self.cursor.and_then(|idx| self.entries.get(idx).copied())
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn entries(&self) -> &[TextRange] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn step(&mut self, delta: isize) {
        let raw = self.cursor.map_or(-1, |c| c as isize) + delta;
        self.cursor = Self::clamp(raw, self.entries.len());
    }

    /// Clamps a raw cursor value against `len` recorded entries.
    ///
    /// Empty history is always `None`; otherwise the value is pinned into
    /// `[0, len - 1]`.
    pub fn clamp(raw: isize, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let last = len as isize - 1;
        Some(raw.clamp(0, last) as usize)
    }
}
