//! Configuration management for pathrun
//!
//! Settings are merged from embedded defaults, user and project config files
//! (TOML, JSON or YAML), `PATHRUN_*` environment variables and command-line
//! flags, in that order of increasing priority.
//!
//! ```yaml
//! workers: 4
//! output: colored
//! jobs:
//!   - name: python-deps
//!     pattern: '^(.*requirements\.txt)$'
//!     command: ["bash", "-c", "cat $1"]
//! ```

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

pub mod core;
pub mod formats;
pub mod smart_load;

pub use self::core::{CliOverrides, PathrunConfig};
pub use formats::ConfigFormat;

/// One named `{pattern, command}` unit from configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanJobSpec {
    pub name: String,

    /// Regex tested against every visited path
    pub pattern: String,

    /// Program followed by its arguments; tokens may reference capture groups
    pub command: Vec<String>,
}

/// How a command's stdout and stderr reach the user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum OutputMode {
    /// Stream lines as they arrive, stdout in green and stderr in red
    #[default]
    #[serde(rename = "colored", alias = "streamed-colored")]
    #[value(name = "colored", alias = "streamed-colored")]
    Colored,

    /// Stream lines as they arrive without color
    #[serde(rename = "no-color", alias = "streamed-plain")]
    #[value(name = "no-color", alias = "streamed-plain")]
    Plain,

    /// Buffer everything and report it in the log once the command exits
    #[serde(rename = "none", alias = "captured-only")]
    #[value(name = "none", alias = "captured-only")]
    Captured,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Fully merged settings for a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub log_level: LogLevel,

    pub output: OutputMode,

    /// Number of concurrent command workers per job
    pub workers: usize,

    /// Resolve and log commands without running them
    pub dry_run: bool,

    /// Run only the job with this name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<String>,

    pub jobs: Vec<ScanJobSpec>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            output: OutputMode::default(),
            workers: crate::scan::DEFAULT_WORKERS,
            dry_run: false,
            job: None,
            jobs: Vec::new(),
        }
    }
}

impl Settings {
    /// Reject settings no run could start with
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            bail!("'workers' must be at least 1");
        }
        Ok(())
    }
}
