//! Language engine backed by a child process.
//!
//! Each submitted form is written to the child's stdin as one line. Every
//! line the child prints on stdout or stderr comes back as incoming output;
//! stderr lines are tagged red.

use std::process::Stdio;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result, bail};
use replete_core::engine::{Formatted, LanguageEngine, OutputCallback};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::{ChildStdin, Command};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

const STDERR_MARKUP: &str = "\u{1b}[31m";

type SharedCallback = Arc<Mutex<Option<Arc<dyn Fn(bool, String) + Send + Sync>>>>;

pub struct ProcessEngine {
    program: String,
    args: Vec<String>,
    version: String,
    runtime: Handle,
    width: AtomicU16,
    callback: SharedCallback,
    input_tx: mpsc::UnboundedSender<String>,
    /// Taken by `initialize`; input sent earlier waits in the channel.
    input_rx: Mutex<Option<mpsc::UnboundedReceiver<String>>>,
}

impl ProcessEngine {
    /// Describes the child without starting it. `initialize` spawns it on
    /// `runtime`.
    pub fn new(
        command: Vec<String>,
        version: Option<String>,
        width: u16,
        runtime: Handle,
    ) -> Result<Self> {
        let mut command = command.into_iter();
        let program = command.next().context("Engine command is empty")?;
        let args: Vec<String> = command.collect();
        let version = version.unwrap_or_else(|| program.clone());
        let (input_tx, input_rx) = mpsc::unbounded_channel();

        Ok(Self {
            program,
            args,
            version,
            runtime,
            width: AtomicU16::new(width),
            callback: Arc::new(Mutex::new(None)),
            input_tx,
            input_rx: Mutex::new(Some(input_rx)),
        })
    }

    fn emit(&self, incoming: bool, text: String) {
        emit(&self.callback, incoming, text);
    }

    fn spawn_child(&self) -> Result<()> {
        let Some(input_rx) = self
            .input_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        else {
            bail!("Engine already initialized");
        };

        let _guard = self.runtime.enter();
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .env("COLUMNS", self.width.load(Ordering::Relaxed).to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to spawn engine '{}'", self.program))?;

        let stdin = child.stdin.take().context("Engine stdin not captured")?;
        let stdout = child.stdout.take().context("Engine stdout not captured")?;
        let stderr = child.stderr.take().context("Engine stderr not captured")?;
        info!(program = %self.program, pid = ?child.id(), "engine process started");

        self.runtime.spawn(write_input(stdin, input_rx));
        self.runtime
            .spawn(forward_lines(stdout, Arc::clone(&self.callback), ""));
        self.runtime.spawn(forward_lines(
            stderr,
            Arc::clone(&self.callback),
            STDERR_MARKUP,
        ));
        self.runtime.spawn(async move {
            match child.wait().await {
                Ok(status) => info!(%status, "engine process exited"),
                Err(err) => warn!("waiting on engine process failed: {err}"),
            }
        });
        Ok(())
    }
}

impl LanguageEngine for ProcessEngine {
    fn evaluate(&self, source: &str) {
        if self.input_tx.send(source.to_string()).is_err() {
            warn!("engine input closed, dropping evaluation");
        }
    }

    fn version(&self) -> String {
        self.version.clone()
    }

    fn format_incremental(
        &self,
        _text: &str,
        _cursor: usize,
        _enter_pressed: bool,
    ) -> Option<Formatted> {
        None
    }

    fn initialize(&self) -> Result<()> {
        self.spawn_child().inspect_err(|err| {
            self.emit(true, format!("{STDERR_MARKUP}{err:#}"));
        })
    }

    fn set_output_callback(&self, callback: OutputCallback) {
        *self.callback.lock().unwrap_or_else(PoisonError::into_inner) = Some(Arc::from(callback));
    }

    fn set_width(&self, columns: u16) {
        let previous = self.width.swap(columns, Ordering::Relaxed);
        if previous != columns {
            debug!(columns, "engine width changed");
        }
    }
}

fn emit(callback: &SharedCallback, incoming: bool, text: String) {
    let callback = callback
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    if let Some(callback) = callback {
        callback(incoming, text);
    }
}

async fn write_input(mut stdin: ChildStdin, mut input_rx: mpsc::UnboundedReceiver<String>) {
    while let Some(source) = input_rx.recv().await {
        let result = async {
            stdin.write_all(source.as_bytes()).await?;
            stdin.write_all(b"\n").await?;
            stdin.flush().await
        }
        .await;
        if let Err(err) = result {
            warn!("writing to engine failed: {err}");
            break;
        }
    }
}

async fn forward_lines(
    reader: impl AsyncRead + Unpin,
    callback: SharedCallback,
    markup: &'static str,
) {
    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => emit(&callback, true, format!("{markup}{line}")),
            Ok(None) => break,
            Err(err) => {
                warn!("reading engine output failed: {err}");
                break;
            }
        }
    }
}
