use anyhow::{Result, bail};
use clap::{Args, Subcommand};

use crate::cli::Output;
use crate::config::{ConfigFormat, PathrunConfig};
use crate::scan::CompiledJob;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Display current merged configuration
    Show {
        #[arg(short, long, value_enum, default_value = "toml")]
        format: ConfigFormat,
    },
    /// Validate configuration and every job pattern
    Validate,
}

pub fn execute(args: ConfigArgs, config: &PathrunConfig, output: &Output) -> Result<()> {
    match args.command {
        ConfigCommand::Show { format } => {
            println!("{}", config.export_config(format)?);
        }
        ConfigCommand::Validate => {
            let settings = config.settings()?;

            let invalid: Vec<String> = settings
                .jobs
                .iter()
                .filter_map(|spec| CompiledJob::compile(spec).err())
                .map(|err| err.to_string())
                .collect();

            if !invalid.is_empty() {
                for message in &invalid {
                    output.error(message);
                }
                bail!("{} of {} jobs are invalid", invalid.len(), settings.jobs.len());
            }

            output.success(&format!(
                "Configuration is valid ({} jobs)",
                settings.jobs.len()
            ));
        }
    }

    Ok(())
}
