use anyhow::{Context, Result, anyhow, bail};
use crossbeam::channel::bounded;
use std::path::Path;
use tracing::{debug, error, info, warn};

use super::template::CompiledJob;
use super::types::{JobDescriptor, JobReport, ScanSummary, SkippedJob, WorkerStats};
use super::walker;
use super::worker::Worker;
use crate::config::{OutputMode, ScanJobSpec, Settings};

/// Default size of the worker pool
pub const DEFAULT_WORKERS: usize = 5;

/// Knobs the orchestrator needs from configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    pub workers: usize,
    pub output: OutputMode,
    pub dry_run: bool,
    /// Run only the job with this name
    pub job_filter: Option<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            output: OutputMode::default(),
            dry_run: false,
            job_filter: None,
        }
    }
}

impl From<&Settings> for ScanOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            workers: settings.workers,
            output: settings.output,
            dry_run: settings.dry_run,
            job_filter: settings.job.clone(),
        }
    }
}

/// Runs configured jobs one after another over a directory tree
///
/// Within a job, walkers and workers run concurrently; jobs themselves never
/// overlap.
#[derive(Debug, Clone)]
pub struct Scanner {
    options: ScanOptions,
}

impl Scanner {
    pub fn new(options: ScanOptions) -> Result<Self> {
        if options.workers == 0 {
            bail!("Worker count must be at least 1");
        }
        Ok(Self { options })
    }

    /// Run every selected job against `root`, skipping jobs that fail to compile
    pub fn run(&self, root: &Path, jobs: &[ScanJobSpec]) -> Result<ScanSummary> {
        info!(root = %root.display(), jobs = jobs.len(), "Starting scan");
        let mut summary = ScanSummary::default();

        let selected: Vec<&ScanJobSpec> = jobs
            .iter()
            .filter(|job| self.options.job_filter.as_deref().is_none_or(|name| name == job.name))
            .collect();

        if let Some(name) = &self.options.job_filter
            && selected.is_empty()
        {
            warn!(job = %name, "No configured job has this name");
        }

        for spec in selected {
            info!(root = %root.display(), job = %spec.name, pattern = %spec.pattern, "Starting job");

            let job = match CompiledJob::compile(spec) {
                Ok(job) => job,
                Err(err) => {
                    error!(job = %spec.name, pattern = %spec.pattern, error = %err, "Skipping job");
                    summary.skipped.push(SkippedJob {
                        name: spec.name.clone(),
                        reason: err.to_string(),
                    });
                    continue;
                }
            };

            record_outcome(&mut summary, job.name(), self.run_job(root, &job));
        }

        info!(root = %root.display(), "Scan done");
        Ok(summary)
    }

    /// Run one compiled job to completion
    ///
    /// The queue closes once the last walker has finished and every worker has
    /// drained it before this returns.
    pub fn run_job(&self, root: &Path, job: &CompiledJob) -> Result<JobReport> {
        let (tx, rx) = bounded::<JobDescriptor>(0);

        let (walk, commands) = crossbeam::thread::scope(|s| -> Result<_> {
            debug!(workers = self.options.workers, job = %job.name(), "Starting workers");
            let mut workers = Vec::with_capacity(self.options.workers);
            for id in 1..=self.options.workers {
                let worker = Worker::new(id, self.options.output, self.options.dry_run);
                let rx = rx.clone();
                let handle = s
                    .builder()
                    .name(format!("worker-{id}"))
                    .spawn(move |_| worker.run(rx))
                    .with_context(|| format!("Failed to start worker {id} for job '{}'", job.name()))?;
                workers.push(handle);
            }
            // Only workers hold receivers now, so walkers stop if they all exit.
            drop(rx);

            let walk = walker::walk(root, job, &tx);

            // Every walker has dropped its sender; this one is the last.
            drop(tx);
            debug!(job = %job.name(), "Job queue closed, waiting for workers");

            let mut commands = WorkerStats::default();
            for handle in workers {
                commands += handle
                    .join()
                    .map_err(|_| anyhow!("Worker thread panicked during job '{}'", job.name()))?;
            }

            Ok((walk?, commands))
        })
        .map_err(|_| anyhow!("Thread panic occurred during job '{}'", job.name()))??;

        Ok(JobReport {
            name: job.name().to_string(),
            walk,
            commands,
        })
    }
}

/// Add a finished job to the summary; a job that could not complete is skipped, not fatal
fn record_outcome(summary: &mut ScanSummary, name: &str, outcome: Result<JobReport>) {
    match outcome {
        Ok(report) => {
            info!(
                job = %report.name,
                matched = report.walk.matched,
                succeeded = report.commands.succeeded,
                failed = report.commands.failed,
                "Job done"
            );
            summary.reports.push(report);
        }
        Err(err) => {
            error!(job = %name, error = %format!("{err:#}"), "Job aborted, continuing with the next one");
            summary.skipped.push(SkippedJob {
                name: name.to_string(),
                reason: format!("{err:#}"),
            });
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn spec(name: &str, pattern: &str, command: &[&str]) -> ScanJobSpec {
        ScanJobSpec {
            name: name.to_string(),
            pattern: pattern.to_string(),
            command: command.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn options(workers: usize) -> ScanOptions {
        ScanOptions {
            workers,
            output: OutputMode::Captured,
            ..ScanOptions::default()
        }
    }

    #[test]
    fn test_zero_workers_rejected() {
        assert!(Scanner::new(options(0)).is_err());
    }

    #[test]
    fn test_run_job_counts_matches_and_commands() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("a/b")).unwrap();
        fs::write(temp.path().join("a/x.rs"), "").unwrap();
        fs::write(temp.path().join("a/b/y.rs"), "").unwrap();
        fs::write(temp.path().join("a/b/z.md"), "").unwrap();

        let scanner = Scanner::new(options(2)).unwrap();
        let job = CompiledJob::compile(&spec("rust", r"\.rs$", &["true"])).unwrap();
        let report = scanner.run_job(temp.path(), &job).unwrap();

        assert_eq!(report.walk.matched, 2);
        assert_eq!(report.commands.received, 2);
        assert_eq!(report.commands.succeeded, 2);
    }

    #[test]
    fn test_job_filter_selects_single_job() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("file"), "").unwrap();

        let scanner = Scanner::new(ScanOptions {
            job_filter: Some("second".to_string()),
            ..options(1)
        })
        .unwrap();
        let jobs = vec![
            spec("first", ".*", &["true"]),
            spec("second", ".*", &["true"]),
        ];

        let summary = scanner.run(temp.path(), &jobs).unwrap();

        assert_eq!(summary.reports.len(), 1);
        assert_eq!(summary.reports[0].name, "second");
    }

    #[test]
    fn test_aborted_job_is_recorded_and_later_jobs_kept() {
        let mut summary = ScanSummary::default();
        let finished = JobReport {
            name: "after".to_string(),
            walk: Default::default(),
            commands: WorkerStats::default(),
        };

        record_outcome(&mut summary, "crashed", Err(anyhow!("Worker thread panicked")));
        record_outcome(&mut summary, "after", Ok(finished.clone()));

        assert_eq!(summary.reports, vec![finished]);
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].name, "crashed");
        assert!(summary.skipped[0].reason.contains("panicked"));
    }

    #[test]
    fn test_unknown_filter_runs_nothing() {
        let temp = TempDir::new().unwrap();
        let scanner = Scanner::new(ScanOptions {
            job_filter: Some("missing".to_string()),
            ..options(1)
        })
        .unwrap();

        let summary = scanner.run(temp.path(), &[spec("only", ".*", &["true"])]).unwrap();
        assert!(summary.reports.is_empty());
        assert!(summary.skipped.is_empty());
    }
}
