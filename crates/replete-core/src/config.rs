//! Configuration management for Replete.
//!
//! Loads configuration from ${REPLETE_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::style::{ColorTag, ParagraphStyle};

/// Placeholder replaced by the engine version in the masthead template.
pub const VERSION_PLACEHOLDER: &str = "{version}";

const DEFAULT_MASTHEAD: &str = "ClojureScript {version}
    Docs: (doc function-name)
          (find-doc \"part-of-name\")
  Source: (source function-name)
 Results: Stored in *1, *2, *3,
          an exception in *e
";

/// How transcript entries are laid out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Space before echoed input, in points.
    pub input_spacing: f32,
    /// Space before engine output, in points.
    pub output_spacing: f32,
    pub show_masthead: bool,
    /// Startup banner. `{version}` is replaced by the engine version.
    pub masthead: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            input_spacing: 10.0,
            output_spacing: 5.0,
            show_masthead: true,
            masthead: DEFAULT_MASTHEAD.to_string(),
        }
    }
}

impl DisplayConfig {
    /// Echoed input: heavier spacing, muted foreground.
    pub fn input_paragraph(&self) -> ParagraphStyle {
        ParagraphStyle {
            spacing_before: self.input_spacing,
            foreground: Some(ColorTag::Muted),
        }
    }

    /// Engine output: lighter spacing, colors come from its own spans only.
    pub fn output_paragraph(&self) -> ParagraphStyle {
        ParagraphStyle {
            spacing_before: self.output_spacing,
            foreground: None,
        }
    }

    /// Masthead: output spacing, muted like input.
    pub fn masthead_paragraph(&self) -> ParagraphStyle {
        ParagraphStyle {
            spacing_before: self.output_spacing,
            foreground: Some(ColorTag::Muted),
        }
    }

    pub fn render_masthead(&self, version: &str) -> String {
        self.masthead.replace(VERSION_PLACEHOLDER, version)
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    pub filter: String,
    /// Log file name inside `REPLETE_HOME`.
    pub file: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: LogConfig::DEFAULT_FILTER.to_string(),
            file: "replete.log".to_string(),
        }
    }
}

impl LogConfig {
    pub const DEFAULT_FILTER: &str = "replete_core=info,replete=info";
    pub const DEBUG_FILTER: &str = "replete_core=debug,replete=debug";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Columns passed to the engine before the first resize arrives.
    pub terminal_width: u16,
    pub display: DisplayConfig,
    pub log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            terminal_width: Config::DEFAULT_TERMINAL_WIDTH,
            display: DisplayConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Config {
    const DEFAULT_TERMINAL_WIDTH: u16 = 80;

    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be resolved or the
    /// file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path()?)
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Writes a default config file, creating parent directories.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            bail!("Config file already exists at {}", path.display());
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let contents =
            toml::to_string_pretty(&Config::default()).context("Failed to serialize config")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }
}

pub mod paths {
    //! Path resolution for Replete configuration and logs.
    //!
    //! REPLETE_HOME resolution order:
    //! 1. REPLETE_HOME environment variable (if set)
    //! 2. ~/.config/replete (default)

    use std::path::PathBuf;

    use anyhow::{Context, Result};

    /// Returns the Replete home directory.
    ///
    /// # Errors
    /// Returns an error if `REPLETE_HOME` is unset and no home directory exists.
    pub fn replete_home() -> Result<PathBuf> {
        if let Ok(home) = std::env::var("REPLETE_HOME") {
            return Ok(PathBuf::from(home));
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("replete"))
            .context("Could not determine home directory")
    }

    /// Returns the path to the config.toml file.
    ///
    /// # Errors
    /// See [`replete_home`].
    pub fn config_path() -> Result<PathBuf> {
        Ok(replete_home()?.join("config.toml"))
    }
}
