//! Session runtime: owns the controller and runs the event loop.
//!
//! ## Inbox Pattern
//!
//! All mutation of the transcript, history and readiness flag happens on the
//! single task running [`SessionRuntime::run`]:
//! - The editor widget sends `SessionEvent`s through a [`SessionHandle`]
//! - The engine's output callback only enqueues `EngineOutput` events, from
//!   whatever thread it fires on
//! - Engine initialization runs on a blocking thread and enqueues
//!   `EngineReady` when it finishes
//! - The loop applies one event at a time and forwards the resulting effects
//!
//! Cancellation is checked between events, so an event is either fully
//! applied or not applied at all.

mod inbox;

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub use inbox::{SessionEffectReceiver, SessionEventReceiver, SessionEventSender};
use inbox::SessionEffectSender;

use crate::config::Config;
use crate::effects::SessionEffect;
use crate::engine::LanguageEngine;
use crate::events::SessionEvent;
use crate::history::Direction;
use crate::session::SessionController;

/// Clonable handle for feeding events into a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    inbox_tx: SessionEventSender,
}

impl SessionHandle {
    /// Queues an event. Returns false once the session has stopped.
    pub fn send(&self, event: SessionEvent) -> bool {
        self.inbox_tx.send(event).is_ok()
    }

    pub fn submit(&self, text: impl Into<String>) -> bool {
        self.send(SessionEvent::Submit { text: text.into() })
    }

    pub fn text_changed(&self, text: impl Into<String>, cursor: usize) -> bool {
        self.send(SessionEvent::TextChanged {
            text: text.into(),
            cursor,
        })
    }

    pub fn move_history(&self, direction: Direction) -> bool {
        self.send(SessionEvent::MoveHistory(direction))
    }

    pub fn resize(&self, columns: u16) -> bool {
        self.send(SessionEvent::Resize { columns })
    }
}

pub struct SessionRuntime {
    controller: SessionController,
    engine: Arc<dyn LanguageEngine>,
    inbox_tx: SessionEventSender,
    inbox_rx: SessionEventReceiver,
    effects_tx: SessionEffectSender,
}

impl SessionRuntime {
    /// Creates a runtime plus the handle and effect stream for the widget.
    pub fn new(
        engine: Arc<dyn LanguageEngine>,
        config: &Config,
    ) -> (Self, SessionHandle, SessionEffectReceiver) {
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        let (effects_tx, effects_rx) = mpsc::unbounded_channel();

        let controller = SessionController::new(
            Arc::clone(&engine),
            config.display.clone(),
            config.terminal_width,
        );
        let handle = SessionHandle {
            inbox_tx: inbox_tx.clone(),
        };

        let runtime = Self {
            controller,
            engine,
            inbox_tx,
            inbox_rx,
            effects_tx,
        };
        (runtime, handle, effects_rx)
    }

    /// Runs the session until `cancel` fires or every sender is gone.
    ///
    /// Returns the controller so callers can inspect the final transcript.
    pub async fn run(mut self, cancel: CancellationToken) -> SessionController {
        // Weak so the engine alone does not keep the session running.
        let output_tx = self.inbox_tx.downgrade();
        self.engine
            .set_output_callback(Box::new(move |incoming, text| {
                if let Some(tx) = output_tx.upgrade() {
                    let _ = tx.send(SessionEvent::EngineOutput { incoming, text });
                }
            }));

        let masthead = self.controller.start();
        self.publish(masthead);

        self.spawn_initialize(cancel.child_token());

        // The loop must not keep its own inbox alive.
        let Self {
            mut controller,
            inbox_tx,
            mut inbox_rx,
            effects_tx,
            ..
        } = self;
        drop(inbox_tx);

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    debug!("session cancelled");
                    break;
                }
                event = inbox_rx.recv() => {
                    let Some(event) = event else {
                        debug!("session inbox closed");
                        break;
                    };
                    let effects = controller.update(event);
                    publish_to(&effects_tx, effects);
                }
            }
        }

        controller
    }

    /// Loads the engine off the session task and reports back through the inbox.
    fn spawn_initialize(&self, cancel: CancellationToken) {
        let engine = Arc::clone(&self.engine);
        // Weak so a slow load does not outlive the last handle.
        let inbox_tx = self.inbox_tx.downgrade();

        tokio::spawn(async move {
            info!("initializing engine");
            let result = tokio::task::spawn_blocking(move || engine.initialize()).await;
            match result {
                Ok(Ok(())) if cancel.is_cancelled() => {
                    debug!("engine ready after session cancelled");
                }
                Ok(Ok(())) => {
                    info!("engine initialized");
                    match inbox_tx.upgrade() {
                        Some(tx) => {
                            let _ = tx.send(SessionEvent::EngineReady);
                        }
                        None => debug!("engine ready after session ended"),
                    }
                }
                Ok(Err(err)) => warn!("engine initialization failed: {err:#}"),
                Err(err) => warn!("engine initialization task failed: {err}"),
            }
        });
    }

    fn publish(&self, effects: Vec<SessionEffect>) {
        publish_to(&self.effects_tx, effects);
    }
}

fn publish_to(effects_tx: &SessionEffectSender, effects: Vec<SessionEffect>) {
    for effect in effects {
        if effects_tx.send(effect).is_err() {
            debug!("effect receiver dropped");
            return;
        }
    }
}
