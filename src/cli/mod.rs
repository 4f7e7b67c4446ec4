//! Command-line interface for pathrun
//!
//! Parses flags with clap, merges them over file and environment
//! configuration, installs the log subscriber and dispatches to a command.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::Path;
use tracing::warn;

use crate::config::{CliOverrides, LogLevel, PathrunConfig};

pub mod commands;
mod output;

pub use output::Output;

/// Walk a directory tree and run a command for every path matching a pattern
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file path (replaces the user and project config files)
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<String>,

    /// Log level
    #[arg(short, long, value_enum, global = true)]
    pub log_level: Option<LogLevel>,

    /// Suppress the summary printed after a command
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan a directory recursively and run matching jobs' commands
    Scan(commands::scan::ScanArgs),
    /// List configured jobs
    Jobs,
    /// Configuration management
    Config(commands::config::ConfigArgs),
    /// Show version information
    Version,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let config = PathrunConfig::load_with_custom_config(self.config.as_deref(), &self.overrides())?;
        setup_logging(config.log_level());

        if let Some(path) = &self.config
            && !Path::new(path).exists()
        {
            warn!(path = %path, "Config file not found, using defaults");
        }

        let output = Output::new(self.quiet);

        match self.command {
            Commands::Scan(args) => commands::scan::execute(args, &config, &output),
            Commands::Jobs => commands::jobs::execute(&config, &output),
            Commands::Config(args) => commands::config::execute(args, &config, &output),
            Commands::Version => commands::version::execute(),
        }
    }

    /// Flags that take priority over every config source
    fn overrides(&self) -> CliOverrides {
        let mut overrides = CliOverrides {
            log_level: self.log_level,
            ..CliOverrides::default()
        };

        if let Commands::Scan(args) = &self.command {
            overrides.workers = args.workers;
            overrides.output = args.output;
            overrides.job = args.job.clone();
            if args.dry_run {
                overrides.dry_run = Some(true);
            }
        }

        overrides
    }
}

/// Install the global log subscriber; `RUST_LOG` wins over the configured level
pub fn setup_logging(level: LogLevel) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.as_str()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
