//! Events consumed by the session.
//!
//! The editor widget and the engine callbacks both feed the session through
//! this one type, so every mutation is applied on the session task in
//! arrival order.

use crate::history::Direction;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Printed output from the engine.
    EngineOutput { incoming: bool, text: String },

    /// Engine initialization finished.
    EngineReady,

    /// A key-level edit is about to be applied to the input.
    EditRequested {
        current_text: String,
        location: usize,
        replacement: String,
    },

    /// The input text changed.
    TextChanged { text: String, cursor: usize },

    /// The user asked to evaluate the input.
    Submit { text: String },

    /// Step through the input history.
    MoveHistory(Direction),

    /// The user clicked at a character offset in the transcript.
    SelectFromClick { offset: usize },

    /// The output view changed width.
    Resize { columns: u16 },
}
