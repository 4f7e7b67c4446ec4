//! Concurrent directory traversal
//!
//! Each walker lists one directory, tests every entry against the job's
//! pattern and hands matches to the job queue. Subdirectories are never
//! descended in place: every one gets its own walker thread, so traversal fans
//! out one thread per directory in the tree. That is independent of the worker
//! count; the unbuffered queue is what keeps walkers from racing far ahead of
//! the workers.
//!
//! A directory whose own path matches is dispatched *and* descended.
//!
//! [`walk`] returns only after the [`TaskGroup`] barrier has seen every walker
//! finish, including walkers started by other walkers. The root is walked on
//! the calling thread; every spawned walker owns its own clone of the queue
//! sender, so the caller's sender is the last one left when `walk` returns and
//! dropping it closes the queue.
//!
//! When the OS refuses another thread the directory is walked inline by its
//! parent instead, so a refused spawn costs parallelism, never entries.

use anyhow::{Result, anyhow};
use crossbeam::channel::Sender;
use crossbeam::thread::Scope;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, trace, warn};
use walkdir::WalkDir;

use super::error::ScanError;
use super::template::CompiledJob;
use super::types::{JobDescriptor, WalkStats};
use crate::parallel::{TaskGroup, TaskToken};

#[derive(Debug, Default)]
struct WalkCounters {
    directories: AtomicUsize,
    entries: AtomicUsize,
    matched: AtomicUsize,
    errors: AtomicUsize,
}

struct WalkContext<'a> {
    job: &'a CompiledJob,
    counters: &'a WalkCounters,
}

/// Walk the tree under `root`, sending a descriptor for every matching entry
///
/// Blocks until the whole walker tree has finished.
pub fn walk(root: &Path, job: &CompiledJob, queue: &Sender<JobDescriptor>) -> Result<WalkStats> {
    let counters = WalkCounters::default();
    let ctx = WalkContext {
        job,
        counters: &counters,
    };

    let tasks = crossbeam::thread::scope(|s| {
        let group = TaskGroup::new();
        let token = group.token();
        walk_dir(s, &ctx, root, queue, &token);
        drop(token);
        group.wait()
    })
    .map_err(|_| anyhow!("Walker thread panicked while scanning {}", root.display()))?;

    Ok(WalkStats {
        directories: counters.directories.load(Ordering::Relaxed),
        entries: counters.entries.load(Ordering::Relaxed),
        matched: counters.matched.load(Ordering::Relaxed),
        errors: counters.errors.load(Ordering::Relaxed),
        peak_walkers: tasks.peak,
    })
}

/// Start a walker for `dir` on its own thread, registered under `parent`
fn spawn_walker<'env>(
    scope: &Scope<'env>,
    ctx: &'env WalkContext<'env>,
    dir: PathBuf,
    queue: &Sender<JobDescriptor>,
    parent: &TaskToken,
) {
    let token = parent.child();
    let thread_queue = queue.clone();
    let thread_dir = dir.clone();

    let spawned = scope.builder().spawn(move |scope| {
        walk_dir(scope, ctx, &thread_dir, &thread_queue, &token);
        drop(thread_queue);
        drop(token);
    });

    if let Err(err) = spawned {
        warn!(
            job = %ctx.job.name(),
            dir = %dir.display(),
            error = %err,
            "Could not start walker thread, walking directory inline"
        );
        walk_dir(scope, ctx, &dir, queue, parent);
    }
}

fn walk_dir<'env>(
    scope: &Scope<'env>,
    ctx: &'env WalkContext<'env>,
    dir: &Path,
    queue: &Sender<JobDescriptor>,
    token: &TaskToken,
) {
    trace!(job = %ctx.job.name(), dir = %dir.display(), "Walker started");
    ctx.counters.directories.fetch_add(1, Ordering::Relaxed);

    let entries = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name();

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(source) => {
                let path = source.path().unwrap_or(dir).to_path_buf();
                let err = ScanError::Traversal { path, source };
                warn!(job = %ctx.job.name(), error = %err, "Skipping unreadable entry");
                ctx.counters.errors.fetch_add(1, Ordering::Relaxed);
                continue;
            }
        };

        ctx.counters.entries.fetch_add(1, Ordering::Relaxed);
        let path = entry.path();

        if let Some(descriptor) = ctx.job.render(path) {
            debug!(job = %ctx.job.name(), path = %path.display(), "Found match");
            if queue.send(descriptor).is_err() {
                warn!(
                    job = %ctx.job.name(),
                    dir = %dir.display(),
                    "Job queue has no workers left, stopping walker"
                );
                return;
            }
            ctx.counters.matched.fetch_add(1, Ordering::Relaxed);
        }

        if entry.file_type().is_dir() {
            spawn_walker(scope, ctx, path.to_path_buf(), queue, token);
        }
    }

    trace!(job = %ctx.job.name(), dir = %dir.display(), "Walker finished");
}
