//! CLI configuration with TOML file support.

use std::path::Path;

use powork_utils::LogFormat;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Settings shared by every `powork` subcommand.
///
/// Loaded from a TOML file via [`CliConfig::from_toml_file`]; command line
/// flags override whatever the file sets.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Worker threads used by `generate`. Values below 1 are clamped to 1.
    #[serde(default = "default_workers")]
    pub workers: isize,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Give up on `generate` after this many seconds. Unset waits forever.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Values given on the command line or through the environment.
///
/// Each set field replaces the corresponding [`CliConfig`] value.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub workers: Option<isize>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub timeout_secs: Option<u64>,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_workers() -> isize {
    std::thread::available_parallelism().map_or(1, |n| n.get()) as isize
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl CliConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Load the file at `path`, or the defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_toml_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Layer command line values over this configuration.
    pub fn apply_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(workers) = overrides.workers {
            self.workers = workers;
        }
        if let Some(level) = overrides.log_level {
            self.log_level = level;
        }
        if let Some(format) = overrides.log_format {
            self.log_format = format;
        }
        if overrides.timeout_secs.is_some() {
            self.timeout_secs = overrides.timeout_secs;
        }
        self
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("CliConfig is always serializable to TOML")
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            timeout_secs: None,
        }
    }
}
