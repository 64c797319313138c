//! Session controller.
//!
//! Owns the transcript, the input history and the readiness flag. Every
//! operation mutates that state and returns the [`SessionEffect`]s the editor
//! widget should apply. No operation fails: bad input degrades to a no-op or
//! a default.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::balancer;
use crate::config::DisplayConfig;
use crate::effects::SessionEffect;
use crate::engine::LanguageEngine;
use crate::events::SessionEvent;
use crate::history::{Direction, HistoryIndex};
use crate::markup;
use crate::range::TextRange;
use crate::style::{ParagraphStyle, StyleSpan};
use crate::transcript::{EntryKind, TranscriptBuffer};

/// Columns of monospace text that fit in an output view.
///
/// Two columns are held back so engine output never touches the edge.
pub fn terminal_width(view_width: f32, char_width: f32) -> u16 {
    if char_width <= 0.0 || !view_width.is_finite() {
        return 1;
    }
    let columns = (view_width / char_width).floor() - 2.0;
    columns.clamp(1.0, f32::from(u16::MAX)) as u16
}

/// Which editing assist is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Readiness {
    /// Engine still loading; bracket pairing only.
    #[default]
    Initializing,
    /// Engine loaded; its structural formatter handles the input.
    Ready,
}

impl Readiness {
    pub fn is_ready(self) -> bool {
        matches!(self, Readiness::Ready)
    }
}

/// What to do with a key-level edit.
#[derive(Debug, Clone, PartialEq)]
pub enum EditDecision {
    /// Let the widget apply the edit.
    Allow,
    /// The edit was a return at the end of the input; the input was
    /// submitted instead and the edit must be dropped.
    Submitted(Vec<SessionEffect>),
}

/// The live input as last reported by the widget.
#[derive(Debug, Default, Clone)]
struct LiveInput {
    text: String,
    cursor: usize,
}

pub struct SessionController {
    engine: Arc<dyn LanguageEngine>,
    transcript: TranscriptBuffer,
    history: HistoryIndex,
    readiness: Readiness,
    display: DisplayConfig,
    terminal_width: u16,
    enter_pressed: bool,
    live: LiveInput,
}

impl SessionController {
    pub fn new(engine: Arc<dyn LanguageEngine>, display: DisplayConfig, terminal_width: u16) -> Self {
        Self {
            engine,
            transcript: TranscriptBuffer::new(),
            history: HistoryIndex::new(),
            readiness: Readiness::Initializing,
            display,
            terminal_width,
            enter_pressed: false,
            live: LiveInput::default(),
        }
    }

    pub fn transcript(&self) -> &TranscriptBuffer {
        &self.transcript
    }

    pub fn history(&self) -> &HistoryIndex {
        &self.history
    }

    pub fn readiness(&self) -> Readiness {
        self.readiness
    }

    pub fn terminal_width(&self) -> u16 {
        self.terminal_width
    }

    /// Applies one event.
    pub fn update(&mut self, event: SessionEvent) -> Vec<SessionEffect> {
        match event {
            SessionEvent::EngineOutput { incoming, text } => self.on_engine_output(incoming, &text),
            SessionEvent::EngineReady => self.mark_ready(),
            SessionEvent::EditRequested {
                current_text,
                location,
                replacement,
            } => match self.edit_requested(&current_text, location, &replacement) {
                EditDecision::Allow => vec![],
                EditDecision::Submitted(effects) => effects,
            },
            SessionEvent::TextChanged { text, cursor } => {
                let enter = self.take_enter_pressed();
                self.text_changed(&text, cursor, enter)
            }
            SessionEvent::Submit { text } => self.submit_input(&text),
            SessionEvent::MoveHistory(direction) => self.move_history(direction),
            SessionEvent::SelectFromClick { offset } => self.select_from_click(offset),
            SessionEvent::Resize { columns } => {
                self.set_terminal_width(columns);
                vec![]
            }
        }
    }

    /// Appends the startup banner built from the engine version.
    pub fn start(&mut self) -> Vec<SessionEffect> {
        if !self.display.show_masthead {
            return vec![];
        }
        let text = self.display.render_masthead(&self.engine.version());
        let paragraph = self.display.masthead_paragraph();
        let Some(append) = self.append(EntryKind::Masthead, text, Vec::new(), paragraph) else {
            return vec![];
        };
        vec![append, SessionEffect::ScrollToEnd]
    }

    /// Appends printed engine output.
    ///
    /// Empty text and a bare newline are not displayed. Incoming messages
    /// carry a trailing newline so the next entry starts on its own line.
    pub fn on_engine_output(&mut self, incoming: bool, raw: &str) -> Vec<SessionEffect> {
        if raw.is_empty() || raw == "\n" {
            return vec![];
        }

        let marked = markup::extract_styles(raw);
        let mut text = marked.text;
        if incoming {
            text.push('\n');
        }
        let paragraph = self.display.output_paragraph();
        let Some(append) = self.append(EntryKind::Output, text, marked.spans, paragraph) else {
            return vec![];
        };
        vec![append, SessionEffect::ScrollToEnd]
    }

    /// Echoes `text` into the transcript, records it and sends it to the
    /// engine. Whitespace-only input is ignored.
    pub fn submit_input(&mut self, text: &str) -> Vec<SessionEffect> {
        let source = text.trim();
        if source.is_empty() {
            return vec![];
        }

        let paragraph = self.display.input_paragraph();
        let mut effects = Vec::with_capacity(3);
        if let Some(append) = self.append(EntryKind::Input, source, Vec::new(), paragraph) {
            if let SessionEffect::AppendEntry { range, .. } = &append {
                self.history.record_input(*range);
            }
            effects.push(append);
        }

        debug!(len = source.len(), "evaluating input");
        self.engine.set_width(self.terminal_width);
        self.engine.evaluate(source);

        self.live = LiveInput::default();
        effects.push(SessionEffect::ClearInput);
        effects.push(SessionEffect::ScrollToEnd);
        effects
    }

    /// Key-level hook run before an edit is applied.
    ///
    /// A return typed at the very end of the input evaluates it instead of
    /// inserting a newline. Returns elsewhere are let through, and the next
    /// [`Self::text_changed`] sees the enter flag.
    pub fn edit_requested(
        &mut self,
        current_text: &str,
        location: usize,
        replacement: &str,
    ) -> EditDecision {
        if replacement == "\n" {
            self.enter_pressed = true;
        }

        if self.enter_pressed && location == current_text.chars().count() {
            self.enter_pressed = false;
            return EditDecision::Submitted(self.submit_input(current_text));
        }
        EditDecision::Allow
    }

    /// Reads and clears the pending enter flag.
    pub fn take_enter_pressed(&mut self) -> bool {
        std::mem::take(&mut self.enter_pressed)
    }

    /// Runs the editing assist over the changed input.
    ///
    /// Uses the engine formatter once ready and bracket pairing before that.
    /// Emits `SetInput` only when the assist changed something.
    pub fn text_changed(
        &mut self,
        text: &str,
        cursor: usize,
        enter_was_pressed: bool,
    ) -> Vec<SessionEffect> {
        self.enter_pressed = false;
        self.live = LiveInput {
            text: text.to_string(),
            cursor,
        };
        if text.is_empty() {
            return vec![];
        }

        let (new_text, new_cursor) = match self.readiness {
            Readiness::Ready => self
                .engine
                .format_incremental(text, cursor, enter_was_pressed)
                .map_or_else(|| (text.to_string(), cursor), |f| (f.text, f.cursor)),
            Readiness::Initializing => balancer::apply(text, cursor),
        };

        if new_text == text && new_cursor == cursor {
            return vec![];
        }
        self.live = LiveInput {
            text: new_text.clone(),
            cursor: new_cursor,
        };
        vec![SessionEffect::SetInput {
            text: new_text,
            cursor: new_cursor,
        }]
    }

    /// Switches to the engine formatter. Only the first call has an effect.
    ///
    /// Input typed while loading is reformatted right away.
    pub fn mark_ready(&mut self) -> Vec<SessionEffect> {
        if self.readiness.is_ready() {
            warn!("duplicate engine ready signal ignored");
            return vec![];
        }
        self.readiness = Readiness::Ready;
        debug!("engine ready");

        let mut effects = vec![SessionEffect::ReadinessChanged(Readiness::Ready)];
        let LiveInput { text, cursor } = std::mem::take(&mut self.live);
        effects.extend(self.text_changed(&text, cursor, false));
        effects
    }

    /// Steps through history and recalls the selected input.
    pub fn move_history(&mut self, direction: Direction) -> Vec<SessionEffect> {
        self.history.move_in(direction);
        self.refresh()
    }

    /// Selects the input under a click in the transcript and recalls it.
    pub fn select_from_click(&mut self, offset: usize) -> Vec<SessionEffect> {
        if self.history.select_at(offset) {
            self.refresh()
        } else {
            vec![]
        }
    }

    pub fn set_terminal_width(&mut self, columns: u16) {
        self.terminal_width = columns.max(1);
    }

    /// Projects the selected history entry into the input. Never touches
    /// the transcript.
    fn refresh(&mut self) -> Vec<SessionEffect> {
        let Some(range) = self.history.current_range() else {
            return vec![];
        };
        let Some(text) = self.transcript.substring(range) else {
            return vec![];
        };
        self.live = LiveInput {
            cursor: text.chars().count(),
            text: text.clone(),
        };
        vec![SessionEffect::Recall { range, text }]
    }

    fn append(
        &mut self,
        kind: EntryKind,
        text: impl Into<String>,
        spans: Vec<StyleSpan>,
        paragraph: ParagraphStyle,
    ) -> Option<SessionEffect> {
        let text = text.into();
        let range: TextRange = self
            .transcript
            .append(kind, text.clone(), spans.clone(), paragraph);
        if range.is_empty() {
            return None;
        }
        Some(SessionEffect::AppendEntry {
            kind,
            range,
            text,
            spans,
            paragraph,
        })
    }
}

#[cfg(test)]
mod tests;
