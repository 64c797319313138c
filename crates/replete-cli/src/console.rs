//! Line-mode console: stdin lines in, colored transcript out.

use std::io::{self, IsTerminal, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use replete_core::effects::SessionEffect;
use replete_core::history::Direction;
use replete_core::runtime::SessionEffectReceiver;
use replete_core::style::{ColorTag, ParagraphStyle, StyleSpan};
use replete_core::{SessionHandle, SessionRuntime, session};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// How long to keep printing engine output after stdin closes.
const DRAIN_IDLE: Duration = Duration::from_millis(300);

/// Points of paragraph spacing per blank line.
const POINTS_PER_LINE: f32 = 10.0;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Move(Direction),
    Quit,
    Submit(String),
}

/// Interprets one stdin line. An empty line submits the recalled input.
fn parse_line(line: &str, recalled: Option<String>) -> Option<Command> {
    match line.trim() {
        ":back" => Some(Command::Move(Direction::Back)),
        ":forward" => Some(Command::Move(Direction::Forward)),
        ":quit" => Some(Command::Quit),
        "" => recalled.map(Command::Submit),
        _ => Some(Command::Submit(line.to_string())),
    }
}

/// Engine width from the attached terminal, if stdout is one.
pub fn terminal_columns() -> Option<u16> {
    if !io::stdout().is_terminal() {
        return None;
    }
    let (columns, _rows) = crossterm::terminal::size().ok()?;
    Some(session::terminal_width(f32::from(columns), 1.0))
}

/// Remembers the last width sent to the session.
#[derive(Debug, Clone, Copy)]
struct WidthTracker {
    last: Option<u16>,
}

impl WidthTracker {
    /// Returns the width to send when `observed` differs from the last one.
    fn observe(&mut self, observed: Option<u16>) -> Option<u16> {
        let columns = observed?;
        if self.last == Some(columns) {
            return None;
        }
        self.last = Some(columns);
        Some(columns)
    }
}

fn terminal_color(tag: ColorTag) -> Color {
    match tag {
        ColorTag::Black => Color::Reset,
        other => {
            let (r, g, b) = other.rgb();
            Color::Rgb { r, g, b }
        }
    }
}

/// Renders session effects onto a terminal stream.
pub struct Console<W: Write> {
    out: W,
    recalled: Option<String>,
}

impl<W: Write> Console<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            recalled: None,
        }
    }

    pub fn apply(&mut self, effect: &SessionEffect) -> io::Result<()> {
        match effect {
            SessionEffect::AppendEntry {
                text,
                spans,
                paragraph,
                ..
            } => self.print_entry(text, spans, *paragraph),
            SessionEffect::Recall { text, .. } => {
                self.recalled = Some(text.clone());
                let color = terminal_color(ColorTag::Muted);
                queue!(
                    self.out,
                    SetForegroundColor(color),
                    Print(format!("history: {text}\n")),
                    ResetColor
                )?;
                self.out.flush()
            }
            SessionEffect::ScrollToEnd => self.out.flush(),
            SessionEffect::ClearInput => {
                self.recalled = None;
                Ok(())
            }
            SessionEffect::SetInput { .. } => Ok(()),
            SessionEffect::ReadinessChanged(readiness) => {
                debug!(?readiness, "console saw readiness change");
                Ok(())
            }
        }
    }

    fn print_entry(
        &mut self,
        text: &str,
        spans: &[StyleSpan],
        paragraph: ParagraphStyle,
    ) -> io::Result<()> {
        let blank_lines = (paragraph.spacing_before / POINTS_PER_LINE).floor().max(0.0) as usize;
        for _ in 0..blank_lines {
            queue!(self.out, Print("\n"))?;
        }

        let base = paragraph.foreground.map_or(Color::Reset, terminal_color);
        let chars: Vec<char> = text.chars().collect();

        // Later spans paint over earlier ones.
        let mut colors = vec![base; chars.len()];
        for span in spans {
            let start = span.range.start.min(chars.len());
            let end = span.range.end().min(chars.len());
            colors[start..end].fill(terminal_color(span.color));
        }

        let mut run_start = 0;
        for i in 1..=chars.len() {
            if i == chars.len() || colors[i] != colors[run_start] {
                self.print_run(&chars[run_start..i], colors[run_start])?;
                run_start = i;
            }
        }

        if !text.ends_with('\n') {
            queue!(self.out, Print("\n"))?;
        }
        Ok(())
    }

    fn print_run(&mut self, run: &[char], color: Color) -> io::Result<()> {
        if run.is_empty() {
            return Ok(());
        }
        let run: String = run.iter().collect();
        queue!(self.out, SetForegroundColor(color), Print(run), ResetColor)
    }

    fn take_recalled(&mut self) -> Option<String> {
        self.recalled.take()
    }
}

/// Drives a session from stdin until `:quit`, end of input or cancellation.
///
/// With `follow_terminal`, the terminal size is checked before each line and
/// a changed width is sent to the session.
///
/// # Errors
/// Returns an error if stdin or stdout fail or the session task panics.
pub async fn run(
    runtime: SessionRuntime,
    handle: SessionHandle,
    mut effects: SessionEffectReceiver,
    cancel: CancellationToken,
    follow_terminal: bool,
) -> Result<()> {
    let mut width = WidthTracker {
        last: follow_terminal.then(terminal_columns).flatten(),
    };
    let session = tokio::spawn(runtime.run(cancel.clone()));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut console = Console::new(io::stdout());
    let mut stdin_open = true;

    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            effect = effects.recv() => {
                let Some(effect) = effect else { break };
                console.apply(&effect).context("Failed to write output")?;
            }
            line = lines.next_line(), if stdin_open => {
                let Some(line) = line.context("Failed to read input")? else {
                    debug!("stdin closed, draining output");
                    stdin_open = false;
                    continue;
                };
                if follow_terminal && let Some(columns) = width.observe(terminal_columns()) {
                    handle.resize(columns);
                }
                match parse_line(&line, console.take_recalled()) {
                    Some(Command::Move(direction)) => {
                        handle.move_history(direction);
                    }
                    Some(Command::Quit) => break,
                    Some(Command::Submit(text)) => {
                        handle.submit(text);
                    }
                    None => {}
                }
            }
            () = tokio::time::sleep(DRAIN_IDLE), if !stdin_open => break,
        }
    }

    cancel.cancel();
    let controller = session.await.context("Session task failed")?;
    debug!(
        entries = controller.transcript().len(),
        inputs = controller.history().len(),
        "session finished"
    );
    Ok(())
}
