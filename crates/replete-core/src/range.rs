/// Half-open character range `[start, start + len)` into the transcript.
///
/// Offsets count Unicode scalar values, not bytes. Ranges are handed out by
/// the transcript at append time and are never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextRange {
    pub start: usize,
    pub len: usize,
}

impl TextRange {
    pub fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    /// Exclusive end offset.
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true if `offset` lies inside the range.
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end()
    }

    /// Returns true if the two ranges share at least one offset.
    pub fn intersects(&self, other: &TextRange) -> bool {
        self.start < other.end() && other.start < self.end()
    }

    /// Shifts the range right by `by` characters.
    #[must_use]
    pub fn offset_by(self, by: usize) -> Self {
        Self::new(self.start + by, self.len)
    }
}
