//! Scan-and-dispatch engine
//!
//! For each configured job the [`Scanner`] starts a fixed pool of [`Worker`]s
//! and a tree of directory walkers that share one unbuffered job queue:
//!
//! ```text
//!   walker(root) ─┬─ walker(root/a) ─── walker(root/a/b)
//!                 └─ walker(root/c)
//!        │ matches (JobDescriptor)
//!        ▼
//!   ┌──────────────────┐
//!   │ job queue (0 cap)│──▶ worker 1..=N ──▶ subprocess
//!   └──────────────────┘
//! ```
//!
//! The queue is closed only after the last walker has finished, and the job
//! ends once every worker has drained it. Jobs run one after another.

pub mod error;
pub mod orchestrator;
pub mod template;
pub mod types;
pub mod walker;
pub mod worker;

// Re-export main types for easier access
pub use error::ScanError;
pub use orchestrator::{DEFAULT_WORKERS, ScanOptions, Scanner};
pub use template::CompiledJob;
pub use types::{JobDescriptor, JobReport, ScanSummary, SkippedJob, WalkStats, WorkerStats};
pub use worker::{CapturedOutput, Execution, Worker};
