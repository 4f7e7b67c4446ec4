use crossbeam::sync::WaitGroup;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
struct Counters {
    in_flight: AtomicUsize,
    started: AtomicUsize,
    peak: AtomicUsize,
}

impl Counters {
    fn register(&self) {
        self.started.fetch_add(1, Ordering::Relaxed);
        let current = self.in_flight.fetch_add(1, Ordering::AcqRel) + 1;
        self.peak.fetch_max(current, Ordering::Relaxed);
    }
}

/// Totals reported once a [`TaskGroup`] has drained
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    /// Tasks registered over the lifetime of the group
    pub started: usize,
    /// Highest number of tasks alive at the same time
    pub peak: usize,
}

/// Completion barrier for tasks that spawn more tasks while running
///
/// Every task holds a [`TaskToken`]. New tasks are registered from a live token
/// with [`TaskToken::child`] before they are scheduled, so the count can never
/// touch zero while a descendant is still pending.
#[derive(Debug)]
pub struct TaskGroup {
    wait_group: WaitGroup,
    counters: Arc<Counters>,
}

/// Registration of one running task; dropping it marks the task finished
#[derive(Debug)]
pub struct TaskToken {
    counters: Arc<Counters>,
    _wait_group: WaitGroup,
}

impl TaskGroup {
    pub fn new() -> Self {
        Self {
            wait_group: WaitGroup::new(),
            counters: Arc::new(Counters::default()),
        }
    }

    /// Register a top-level task
    pub fn token(&self) -> TaskToken {
        self.counters.register();
        TaskToken {
            counters: Arc::clone(&self.counters),
            _wait_group: self.wait_group.clone(),
        }
    }

    /// Number of tasks registered and not yet finished
    pub fn in_flight(&self) -> usize {
        self.counters.in_flight.load(Ordering::Acquire)
    }

    /// Block until every task, including tasks registered by other tasks, has finished
    pub fn wait(self) -> TaskStats {
        let counters = self.counters;
        self.wait_group.wait();

        TaskStats {
            started: counters.started.load(Ordering::Relaxed),
            peak: counters.peak.load(Ordering::Relaxed),
        }
    }
}

impl Default for TaskGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskToken {
    /// Register a task started from inside this one
    pub fn child(&self) -> TaskToken {
        self.counters.register();
        TaskToken {
            counters: Arc::clone(&self.counters),
            _wait_group: self._wait_group.clone(),
        }
    }
}

impl Drop for TaskToken {
    fn drop(&mut self) {
        // Runs before the wait group handle is released, so `wait` never
        // returns with a non-zero count.
        self.counters.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}
