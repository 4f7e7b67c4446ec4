//! Command implementations for pathrun CLI
//!
//! Each command is organized into its own module.

pub mod config;
pub mod jobs;
pub mod scan;
pub mod version;
