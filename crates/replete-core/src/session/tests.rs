use std::sync::{Arc, Mutex};

use anyhow::Result;

use super::*;
use crate::engine::{Formatted, OutputCallback};
use crate::style::ColorTag;

/// Engine double that records calls and uppercases on format.
#[derive(Default)]
struct RecordingEngine {
    evaluated: Mutex<Vec<String>>,
    widths: Mutex<Vec<u16>>,
    formatted: Mutex<Vec<(String, usize, bool)>>,
    no_formatter: bool,
}

impl RecordingEngine {
    fn evaluated(&self) -> Vec<String> {
        self.evaluated.lock().unwrap().clone()
    }
}

impl LanguageEngine for RecordingEngine {
    fn evaluate(&self, source: &str) {
        self.evaluated.lock().unwrap().push(source.to_string());
    }

    fn version(&self) -> String {
        "1.10.520".to_string()
    }

    fn format_incremental(
        &self,
        text: &str,
        cursor: usize,
        enter_pressed: bool,
    ) -> Option<Formatted> {
        self.formatted
            .lock()
            .unwrap()
            .push((text.to_string(), cursor, enter_pressed));
        if self.no_formatter {
            return None;
        }
        Some(Formatted::new(text.to_uppercase(), cursor))
    }

    fn initialize(&self) -> Result<()> {
        Ok(())
    }

    fn set_output_callback(&self, _callback: OutputCallback) {}

    fn set_width(&self, columns: u16) {
        self.widths.lock().unwrap().push(columns);
    }
}

fn session() -> (SessionController, Arc<RecordingEngine>) {
    let engine = Arc::new(RecordingEngine::default());
    let controller = SessionController::new(
        Arc::clone(&engine) as Arc<dyn LanguageEngine>,
        DisplayConfig::default(),
        72,
    );
    (controller, engine)
}

fn recalled(effects: &[SessionEffect]) -> Option<(TextRange, &str)> {
    effects.iter().find_map(|e| match e {
        SessionEffect::Recall { range, text } => Some((*range, text.as_str())),
        _ => None,
    })
}

#[test]
fn test_start_appends_masthead() {
    let (mut session, _engine) = session();
    let effects = session.start();

    let entry = &session.transcript().entries()[0];
    assert_eq!(entry.kind, EntryKind::Masthead);
    assert!(entry.text.starts_with("ClojureScript 1.10.520"));
    assert_eq!(entry.paragraph.foreground, Some(ColorTag::Muted));
    assert!(matches!(
        effects.as_slice(),
        [SessionEffect::AppendEntry { kind: EntryKind::Masthead, .. }, SessionEffect::ScrollToEnd]
    ));
}

#[test]
fn test_start_respects_disabled_masthead() {
    let engine = Arc::new(RecordingEngine::default());
    let display = DisplayConfig {
        show_masthead: false,
        ..DisplayConfig::default()
    };
    let mut session = SessionController::new(engine, display, 80);

    assert!(session.start().is_empty());
    assert!(session.transcript().is_empty());
}

#[test]
fn test_submit_appends_records_and_evaluates() {
    let (mut session, engine) = session();
    let effects = session.submit_input("  (+ 1 2)\n");

    assert_eq!(engine.evaluated(), vec!["(+ 1 2)".to_string()]);
    assert_eq!(*engine.widths.lock().unwrap(), vec![72]);

    let entry = &session.transcript().entries()[0];
    assert_eq!(entry.kind, EntryKind::Input);
    assert_eq!(entry.text, "(+ 1 2)");
    assert_eq!(entry.paragraph, DisplayConfig::default().input_paragraph());
    assert_eq!(session.history().current_range(), Some(entry.range));

    assert!(matches!(effects[0], SessionEffect::AppendEntry { kind: EntryKind::Input, .. }));
    assert!(effects.contains(&SessionEffect::ClearInput));
}

#[test]
fn test_empty_submit_is_noop() {
    let (mut session, engine) = session();
    for text in ["", "   ", "\n\t "] {
        assert!(session.submit_input(text).is_empty());
    }
    assert!(session.transcript().is_empty());
    assert_eq!(session.transcript().total_len(), 0);
    assert!(session.history().is_empty());
    assert!(engine.evaluated().is_empty());
}

#[test]
fn test_output_skips_empty_and_bare_newline() {
    let (mut session, _engine) = session();
    assert!(session.on_engine_output(false, "").is_empty());
    assert!(session.on_engine_output(true, "\n").is_empty());
    assert_eq!(session.transcript().total_len(), 0);
}

#[test]
fn test_output_extracts_markup() {
    let (mut session, _engine) = session();
    session.on_engine_output(false, "\u{1b}[34m3");

    let entry = &session.transcript().entries()[0];
    assert_eq!(entry.kind, EntryKind::Output);
    assert_eq!(entry.text, "3");
    assert_eq!(entry.paragraph.foreground, None);
    assert_eq!(
        entry.spans,
        vec![StyleSpan::new(TextRange::new(0, 1), ColorTag::Blue)]
    );
}

#[test]
fn test_incoming_output_gets_trailing_newline() {
    let (mut session, _engine) = session();
    session.on_engine_output(true, "\u{1b}[32m:ok");

    let entry = &session.transcript().entries()[0];
    assert_eq!(entry.text, ":ok\n");
    // The color span stops where the printed text stopped.
    assert_eq!(entry.spans[0].range, TextRange::new(0, 3));
}

#[test]
fn test_text_changed_uses_balancer_while_initializing() {
    let (mut session, engine) = session();

    assert_eq!(
        session.text_changed("(", 1, false),
        vec![SessionEffect::SetInput {
            text: "()".to_string(),
            cursor: 1
        }]
    );
    assert!(session.text_changed("(", 0, false).is_empty());
    assert!(session.text_changed("(def", 4, false).is_empty());
    assert!(engine.formatted.lock().unwrap().is_empty());
}

#[test]
fn test_text_changed_uses_engine_when_ready() {
    let (mut session, engine) = session();
    session.mark_ready();

    let effects = session.text_changed("(inc 1)", 3, true);
    assert_eq!(
        effects,
        vec![SessionEffect::SetInput {
            text: "(INC 1)".to_string(),
            cursor: 3
        }]
    );
    assert_eq!(
        engine.formatted.lock().unwrap().as_slice(),
        &[("(inc 1)".to_string(), 3, true)]
    );
}

#[test]
fn test_missing_formatter_falls_back_to_identity() {
    let engine = Arc::new(RecordingEngine {
        no_formatter: true,
        ..RecordingEngine::default()
    });
    let mut session = SessionController::new(engine, DisplayConfig::default(), 80);
    session.mark_ready();

    assert!(session.text_changed("(", 1, false).is_empty());
}

#[test]
fn test_ready_transition_happens_once() {
    let (mut session, _engine) = session();
    assert_eq!(session.readiness(), Readiness::Initializing);

    let effects = session.mark_ready();
    assert_eq!(effects, vec![SessionEffect::ReadinessChanged(Readiness::Ready)]);
    assert_eq!(session.readiness(), Readiness::Ready);

    assert!(session.mark_ready().is_empty());
    assert_eq!(session.readiness(), Readiness::Ready);
}

#[test]
fn test_ready_reformats_pending_input() {
    let (mut session, _engine) = session();
    session.text_changed("(str", 4, false);

    let effects = session.mark_ready();
    assert_eq!(
        effects,
        vec![
            SessionEffect::ReadinessChanged(Readiness::Ready),
            SessionEffect::SetInput {
                text: "(STR".to_string(),
                cursor: 4
            },
        ]
    );
}

#[test]
fn test_enter_at_end_submits_instead_of_inserting() {
    let (mut session, engine) = session();
    let decision = session.edit_requested("(+ 1 2)", 7, "\n");

    let EditDecision::Submitted(effects) = decision else {
        panic!("expected submission");
    };
    assert!(effects.contains(&SessionEffect::ClearInput));
    assert_eq!(engine.evaluated(), vec!["(+ 1 2)".to_string()]);
    assert!(!session.take_enter_pressed());
}

#[test]
fn test_enter_in_middle_is_passed_to_formatter() {
    let (mut session, engine) = session();
    session.mark_ready();

    assert_eq!(session.edit_requested("(let [a 1])", 6, "\n"), EditDecision::Allow);
    let effects = session.update(SessionEvent::TextChanged {
        text: "(let [\na 1])".to_string(),
        cursor: 7,
    });

    assert!(!effects.is_empty());
    assert!(engine.formatted.lock().unwrap()[0].2);
    assert!(engine.evaluated().is_empty());
    assert!(!session.take_enter_pressed());
}

#[test]
fn test_history_walk_recalls_text() {
    let (mut session, _engine) = session();
    session.start();
    session.submit_input("(def a 1)");
    session.on_engine_output(true, "#'cljs.user/a");
    session.submit_input("(inc a)");
    session.on_engine_output(true, "2");
    session.submit_input("(dec a)");

    let effects = session.move_history(Direction::Back);
    assert_eq!(recalled(&effects).map(|(_, t)| t), Some("(inc a)"));

    let effects = session.move_history(Direction::Back);
    let (range, text) = recalled(&effects).unwrap();
    assert_eq!(text, "(def a 1)");
    assert_eq!(session.transcript().substring(range).as_deref(), Some(text));

    // Pinned at the oldest entry.
    let effects = session.move_history(Direction::Back);
    assert_eq!(recalled(&effects).map(|(_, t)| t), Some("(def a 1)"));
    assert_eq!(session.history().cursor(), Some(0));

    let effects = session.move_history(Direction::Forward);
    assert_eq!(recalled(&effects).map(|(_, t)| t), Some("(inc a)"));
}

#[test]
fn test_history_recall_does_not_mutate_transcript() {
    let (mut session, _engine) = session();
    session.submit_input("(+ 1 2)");
    let len = session.transcript().total_len();

    session.move_history(Direction::Back);
    session.move_history(Direction::Forward);

    assert_eq!(session.transcript().total_len(), len);
}

#[test]
fn test_history_on_empty_session_is_noop() {
    let (mut session, _engine) = session();
    assert!(session.move_history(Direction::Back).is_empty());
    assert!(session.move_history(Direction::Forward).is_empty());
    assert_eq!(session.history().cursor(), None);
}

#[test]
fn test_click_selects_second_input() {
    let (mut session, _engine) = session();
    session.submit_input("(first)");
    session.on_engine_output(true, "nil");
    session.submit_input("(second)");
    session.submit_input("(third)");

    let second = session.history().entries()[1];
    let effects = session.select_from_click(second.start + 2);

    assert_eq!(session.history().cursor(), Some(1));
    assert_eq!(recalled(&effects), Some((second, "(second)")));
}

#[test]
fn test_click_outside_inputs_is_noop() {
    let (mut session, _engine) = session();
    session.submit_input("(first)");
    session.on_engine_output(true, "nil");

    let output_offset = session.transcript().entries()[1].range.start;
    assert!(session.select_from_click(output_offset).is_empty());
    assert_eq!(session.history().cursor(), Some(0));
}

#[test]
fn test_resize_updates_width_passed_to_engine() {
    let (mut session, engine) = session();
    assert!(session.update(SessionEvent::Resize { columns: 100 }).is_empty());
    session.submit_input("(+ 1 1)");

    assert_eq!(*engine.widths.lock().unwrap(), vec![100]);
}

#[test]
fn test_terminal_width_holds_back_two_columns() {
    assert_eq!(terminal_width(700.0, 7.0), 98);
    assert_eq!(terminal_width(10.0, 7.0), 1);
    assert_eq!(terminal_width(700.0, 0.0), 1);
}
