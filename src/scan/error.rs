use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Failures the scan engine reports and recovers from.
///
/// None of these abort a run: a bad job is skipped, an unreadable entry is
/// skipped, and a failed command is logged before the worker moves on.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Invalid pattern for job '{job}': {source}")]
    InvalidPattern {
        job: String,
        #[source]
        source: regex::Error,
    },

    #[error("Job '{job}' has an empty command template")]
    EmptyCommand { job: String },

    #[error("Failed to read {}: {source}", path.display())]
    Traversal {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to start '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' exited with {status}")]
    Exit { command: String, status: ExitStatus },

    #[error("Failed to collect output of '{command}': {source}")]
    Output {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// True for errors that disqualify a whole job before it starts
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::InvalidPattern { .. } | Self::EmptyCommand { .. })
    }
}
