//! Concurrency primitives shared by the scan engine
//!
//! The scan engine runs two kinds of concurrent units per job: a dynamically
//! growing set of directory walkers and a fixed set of command workers. Workers
//! are plain threads joined by the orchestrator. Walkers are harder: every walker
//! may start more walkers while it runs, so "the initial walker returned" says
//! nothing about whether traversal is finished.
//!
//! [`TaskGroup`] is the barrier for that second case:
//!
//! ```text
//! TaskGroup::token() ──▶ walker(root) ──┬─ token.child() ──▶ walker(root/a) ──▶ ...
//!                                       └─ token.child() ──▶ walker(root/b)
//!
//! TaskGroup::wait()  returns only when every token, however deep, is dropped
//! ```
//!
//! # Example
//!
//! ```rust
//! use pathrun::parallel::TaskGroup;
//!
//! let group = TaskGroup::new();
//! let token = group.token();
//! let child = token.child();
//! assert_eq!(group.in_flight(), 2);
//!
//! drop(token);
//! drop(child);
//! let stats = group.wait();
//! assert_eq!(stats.started, 2);
//! ```

pub mod group;

pub use group::{TaskGroup, TaskStats, TaskToken};
