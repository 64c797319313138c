//! File logging setup.
//!
//! The console owns stdout, so logs go to a file in `REPLETE_HOME` through a
//! non-blocking writer. `RUST_LOG` overrides the configured filter.

use std::fs::{self, OpenOptions};
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{LogConfig, paths};

/// Installs the global subscriber, logging into `REPLETE_HOME`.
///
/// Keep the returned guard alive for the whole process; dropping it flushes
/// and stops the writer thread.
///
/// # Errors
/// Returns an error if the log directory or file cannot be created.
pub fn init(config: &LogConfig, debug: bool) -> Result<WorkerGuard> {
    init_in(&paths::replete_home()?, config, debug)
}

/// Same as [`init`] with an explicit log directory.
///
/// # Errors
/// Returns an error if the log directory or file cannot be created.
pub fn init_in(dir: &Path, config: &LogConfig, debug: bool) -> Result<WorkerGuard> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let path = dir.join(&config.file);
    let mut options = OpenOptions::new();
    options.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let file = options
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let (writer, guard) = tracing_appender::non_blocking(file);

    let default_filter = if debug {
        LogConfig::DEBUG_FILTER
    } else {
        config.filter.as_str()
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new(LogConfig::DEFAULT_FILTER));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false);

    // A subscriber may already be installed (tests, embedding hosts).
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init();

    Ok(guard)
}
