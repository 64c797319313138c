//! Interactive session command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, ensure};
use replete_core::config::Config;
use replete_core::{SessionRuntime, logging};
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::console;
use crate::engine::ProcessEngine;

pub struct SessionOptions {
    pub config_path: Option<PathBuf>,
    pub width: Option<u16>,
    pub engine_version: Option<String>,
    pub debug: bool,
    pub no_masthead: bool,
    pub engine: Vec<String>,
}

pub async fn run(options: SessionOptions) -> Result<()> {
    ensure!(
        !options.engine.is_empty(),
        "Missing engine command. Usage: replete [OPTIONS] -- <ENGINE> [ARGS]..."
    );

    let mut config = match &options.config_path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("load config")?;

    if options.no_masthead {
        config.display.show_masthead = false;
    }
    let follow_terminal = options.width.is_none();
    config.terminal_width = options
        .width
        .or_else(console::terminal_columns)
        .unwrap_or(config.terminal_width);

    let _log_guard = logging::init(&config.log, options.debug).context("init logging")?;
    info!(engine = ?options.engine, width = config.terminal_width, "starting session");

    let engine = ProcessEngine::new(
        options.engine,
        options.engine_version,
        config.terminal_width,
        Handle::current(),
    )?;
    let (runtime, handle, effects) = SessionRuntime::new(Arc::new(engine), &config);

    console::run(
        runtime,
        handle,
        effects,
        CancellationToken::new(),
        follow_terminal,
    )
    .await
}
