//! # pathrun - run commands for paths that match a pattern
//!
//! pathrun walks a directory tree and, for every file or directory whose path
//! matches a configured regular expression, runs a command built from that
//! match. Capture groups from the pattern are substituted into the command's
//! tokens, so one job definition covers every matching file in the tree.
//!
//! ## Features
//!
//! - **Concurrent traversal**: one walker thread per directory
//! - **Bounded execution**: a fixed pool of workers runs the commands
//! - **Backpressure**: walkers hand matches to workers over an unbuffered queue
//! - **Layered configuration**: TOML, JSON or YAML files plus `PATHRUN_*` environment variables
//!
//! ## Quick Start
//!
//! ```yaml
//! # pathrun.yaml
//! workers: 2
//! jobs:
//!   - name: python-deps
//!     pattern: '^(.*requirements\.txt)$'
//!     command: ["bash", "-c", "cat $1"]
//! ```
//!
//! ```bash
//! pathrun scan ./projects
//! pathrun scan ./projects --job python-deps --dry-run
//! ```
//!
//! ## Library Usage
//!
//! ```rust,no_run
//! use pathrun::config::ScanJobSpec;
//! use pathrun::scan::{ScanOptions, Scanner};
//! use std::path::Path;
//!
//! let jobs = vec![ScanJobSpec {
//!     name: "python-deps".to_string(),
//!     pattern: r"^(.*requirements\.txt)$".to_string(),
//!     command: vec!["cat".to_string(), "$1".to_string()],
//! }];
//!
//! let scanner = Scanner::new(ScanOptions::default())?;
//! let summary = scanner.run(Path::new("projects"), &jobs)?;
//! println!("{} matches", summary.total_matches());
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod cli;
pub mod config;
pub mod parallel;
pub mod scan;

pub use cli::{Cli, Output};
pub use config::{PathrunConfig, Settings};

/// Result type alias for pathrun operations
pub type Result<T> = anyhow::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
