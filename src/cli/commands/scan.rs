use anyhow::{Result, bail};
use clap::Args;
use std::path::PathBuf;
use std::time::Instant;

use crate::cli::Output;
use crate::config::{OutputMode, PathrunConfig};
use crate::scan::{ScanOptions, ScanSummary, Scanner};

#[derive(Args)]
pub struct ScanArgs {
    /// Directory to scan
    #[arg(value_name = "TARGET_DIRECTORY")]
    pub root: PathBuf,

    /// Run only the job with this name
    #[arg(short, long)]
    pub job: Option<String>,

    /// Number of parallel workers to use for command execution
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// How to print the commands' output
    #[arg(short, long, value_enum)]
    pub output: Option<OutputMode>,

    /// Scan without executing commands
    #[arg(short, long)]
    pub dry_run: bool,
}

pub fn execute(args: ScanArgs, config: &PathrunConfig, output: &Output) -> Result<()> {
    let settings = config.settings()?;

    if !args.root.is_dir() {
        bail!("Target directory does not exist: {}", args.root.display());
    }
    if settings.jobs.is_empty() {
        output.warning("No jobs configured, nothing to do");
        return Ok(());
    }

    let start = Instant::now();
    let scanner = Scanner::new(ScanOptions::from(&settings))?;
    let summary = scanner.run(&args.root, &settings.jobs)?;

    print_summary(&summary, output);
    output.info(&format!(
        "Scanned {} in {:.2}s ({} matches, {} failed)",
        args.root.display(),
        start.elapsed().as_secs_f64(),
        summary.total_matches(),
        summary.total_failed()
    ));

    Ok(())
}

fn print_summary(summary: &ScanSummary, output: &Output) {
    output.section_header("Jobs");

    for report in &summary.reports {
        let commands = &report.commands;
        let detail = if commands.skipped > 0 {
            format!("{} matches, {} dry-run", report.walk.matched, commands.skipped)
        } else {
            format!(
                "{} matches, {} succeeded, {} failed",
                report.walk.matched, commands.succeeded, commands.failed
            )
        };
        output.job_result(&report.name, &detail, commands.failed == 0);

        if report.walk.errors > 0 {
            output.warning(&format!("{} unreadable entries skipped", report.walk.errors));
        }
    }

    for skipped in &summary.skipped {
        output.error(&format!("{} skipped: {}", skipped.name, skipped.reason));
    }
}
