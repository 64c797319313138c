//! CLI entry and dispatch.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

mod commands;

#[derive(Parser)]
#[command(name = "replete")]
#[command(version)]
#[command(about = "Read-eval-print console for an external language engine")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file to load (default: $REPLETE_HOME/config.toml)
    #[arg(long, value_name = "PATH", env = "REPLETE_CONFIG")]
    config: Option<PathBuf>,

    /// Columns passed to the engine (default: terminal width)
    #[arg(long, value_name = "COLUMNS", value_parser = clap::value_parser!(u16).range(1..))]
    width: Option<u16>,

    /// Version shown in the masthead (default: engine program name)
    #[arg(long, value_name = "VERSION")]
    engine_version: Option<String>,

    /// Log at debug level
    #[arg(long)]
    debug: bool,

    /// Do not print the startup masthead
    #[arg(long = "no-masthead")]
    no_masthead: bool,

    /// Engine command line, given after `--`
    #[arg(last = true, value_name = "ENGINE")]
    engine: Vec<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let Cli {
        command,
        config,
        width,
        engine_version,
        debug,
        no_masthead,
        engine,
    } = cli;

    if let Some(Commands::Config { command }) = command {
        return match command {
            ConfigCommands::Path => commands::config::path(),
            ConfigCommands::Init => commands::config::init(),
        };
    }

    let options = commands::session::SessionOptions {
        config_path: config,
        width,
        engine_version,
        debug,
        no_masthead,
        engine,
    };

    // one tokio runtime for the session, the engine and the console
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { commands::session::run(options).await })
}
