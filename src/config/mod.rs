//! Configuration file handling for the isolated runner
//!
//! This module contains the data structures for `runner.yaml`, the optional
//! file tuning artifact lookup, the resolution heuristics and the local
//! repository query.

pub mod runner;

pub use runner::{RepositoryConfig, RunnerConfig, VersionPolicy};
