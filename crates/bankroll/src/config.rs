//! Configuration file support for bankroll.
//!
//! Loads configuration from `bankroll.toml` in the working directory, or
//! from the user config directory.

use anyhow::{Context, Result};
use bankroll_logging::LogFormat;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// The config file name
pub const CONFIG_FILE_NAME: &str = "bankroll.toml";

/// Configuration loaded from `bankroll.toml`
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Path to the SQLite database (default: platform data dir)
    pub database: Option<PathBuf>,
    /// Symbol printed in front of amounts
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging section
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Tracing level filter, overridden by `RUST_LOG`
    #[serde(default = "default_level")]
    pub level: String,
    /// One of `pretty`, `json`, `compact`
    pub format: Option<String>,
    /// Also write logs to files
    #[serde(default)]
    pub file: bool,
    /// Directory for log files (default: platform data dir)
    pub dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: None,
            currency: default_currency(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: None,
            file: false,
            dir: None,
        }
    }
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_level() -> String {
    "warn".to_string()
}

impl Config {
    /// Load configuration, looking in the working directory first and then
    /// in the user config directory.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if a file exists and parses successfully
    /// - `Ok(None)` if no file exists
    /// - `Err(...)` if a file exists but fails to parse (hard error)
    pub fn load(working_dir: &Path) -> Result<Option<Self>> {
        let candidates = [
            Some(working_dir.join(CONFIG_FILE_NAME)),
            dirs::config_dir().map(|d| d.join("bankroll").join(CONFIG_FILE_NAME)),
        ];

        for path in candidates.into_iter().flatten() {
            if path.exists() {
                return Self::from_path(&path).map(Some);
            }
        }

        Ok(None)
    }

    /// Load configuration from an explicit path. The file must exist.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Configured log format, `Pretty` when unset.
    pub fn log_format(&self) -> Result<LogFormat> {
        match self.logging.format {
            Some(ref format) => format
                .parse()
                .map_err(|e: String| anyhow::anyhow!("Invalid logging.format: {}", e)),
            None => Ok(LogFormat::default()),
        }
    }

    /// Directory for log files, if file logging is enabled.
    pub fn log_dir(&self) -> Option<PathBuf> {
        if !self.logging.file {
            return None;
        }
        self.logging.dir.clone().or_else(|| {
            dirs::data_local_dir().map(|d| d.join("bankroll").join("logs"))
        })
    }
}
