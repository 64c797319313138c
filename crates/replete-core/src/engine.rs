//! The language engine seam.
//!
//! The session never evaluates anything itself. It hands source text to a
//! [`LanguageEngine`] and receives printed output back through a callback
//! that may fire on any thread.

use anyhow::Result;

/// Printed-output callback: `(is_incoming, text)`.
pub type OutputCallback = Box<dyn Fn(bool, String) + Send + Sync>;

/// Result of the engine's structural formatter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatted {
    pub text: String,
    pub cursor: usize,
}

impl Formatted {
    pub fn new(text: impl Into<String>, cursor: usize) -> Self {
        Self {
            text: text.into(),
            cursor,
        }
    }
}

/// An embedded language engine.
pub trait LanguageEngine: Send + Sync {
    /// Starts evaluating `source`. Results arrive later through the output
    /// callback, never as a return value.
    fn evaluate(&self, source: &str);

    /// Version string shown in the masthead.
    fn version(&self) -> String;

    /// Structural reformat of the live input.
    ///
    /// Only called once the engine is ready. `None` means no formatter is
    /// available and the input is left as typed.
    fn format_incremental(&self, text: &str, cursor: usize, enter_pressed: bool)
    -> Option<Formatted>;

    /// Loads the engine. Long-running and blocking, so callers run it off
    /// the session task. Returning `Ok` is the only way to become ready.
    ///
    /// # Errors
    /// Returns an error if the engine could not be brought up.
    fn initialize(&self) -> Result<()>;

    /// Registers the printed-output callback. Called once per session.
    fn set_output_callback(&self, callback: OutputCallback);

    /// Tells the engine how many columns the output view can show.
    fn set_width(&self, _columns: u16) {}
}
