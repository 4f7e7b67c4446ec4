use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

/// A resolved command produced by a path match, ready for a worker to run
///
/// Tokens are OS strings so a path that is not valid UTF-8 reaches the
/// program byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDescriptor {
    pub command: OsString,
    pub args: Vec<OsString>,
    pub trigger_path: PathBuf,
}

impl JobDescriptor {
    /// Program name for log lines and error messages
    pub fn program(&self) -> String {
        self.command.to_string_lossy().into_owned()
    }
}

/// The command line as it would be typed, lossily converted for display
impl fmt::Display for JobDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.command.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Traversal totals for one job's walker tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Directories listed, the root included
    pub directories: usize,
    /// Entries tested against the pattern
    pub entries: usize,
    /// Entries that produced a job descriptor
    pub matched: usize,
    /// Unreadable directories or entries that were skipped
    pub errors: usize,
    /// Highest number of walkers running at once
    pub peak_walkers: usize,
}

/// Totals for a single worker over one job
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub received: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Descriptors resolved but not executed (dry run)
    pub skipped: usize,
}

impl std::ops::AddAssign for WorkerStats {
    fn add_assign(&mut self, other: Self) {
        self.received += other.received;
        self.succeeded += other.succeeded;
        self.failed += other.failed;
        self.skipped += other.skipped;
    }
}

/// Outcome of running one named job to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    pub name: String,
    pub walk: WalkStats,
    pub commands: WorkerStats,
}

/// A configured job that was rejected or could not run to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedJob {
    pub name: String,
    pub reason: String,
}

/// Outcome of a whole run, in job order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub reports: Vec<JobReport>,
    pub skipped: Vec<SkippedJob>,
}

impl ScanSummary {
    pub fn total_matches(&self) -> usize {
        self.reports.iter().map(|r| r.walk.matched).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.reports.iter().map(|r| r.commands.failed).sum()
    }

    pub fn report(&self, name: &str) -> Option<&JobReport> {
        self.reports.iter().find(|r| r.name == name)
    }
}
