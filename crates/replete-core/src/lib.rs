//! Core Replete library (transcript, history, session controller, runtime).
//!
//! The editor widget and the language engine live outside this crate. The
//! widget talks to the session through [`events::SessionEvent`]s and renders
//! the returned [`effects::SessionEffect`]s; the engine is reached through the
//! [`engine::LanguageEngine`] trait.

pub mod balancer;
pub mod config;
pub mod effects;
pub mod engine;
pub mod events;
pub mod history;
pub mod logging;
pub mod markup;
pub mod range;
pub mod runtime;
pub mod session;
pub mod style;
pub mod transcript;

pub use runtime::{SessionHandle, SessionRuntime};
pub use session::{Readiness, SessionController};
