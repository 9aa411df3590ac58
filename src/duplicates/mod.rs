//! Duplicate detection module.
//!
//! This module provides the concurrent scan-hash-dedup engine:
//! - [`queue`]: pre-filled work queue whose closure ends the run
//! - [`registry`]: shared digest registry, the only locked state
//! - [`pool`]: fixed-size worker pool
//! - [`collector`]: post-run draining of duplicates and errors
//! - [`finder`]: orchestration from root path to [`ScanReport`]

pub mod collector;
pub mod finder;
pub mod pool;
pub mod queue;
pub mod registry;

use std::path::PathBuf;

use crate::scanner::Digest;

pub use collector::ResultCollector;
pub use finder::{DuplicateFinder, FinderConfig, FinderError, RunState, ScanReport, ScanSummary};
pub use pool::{PoolOutput, WorkerPool, DEFAULT_WORKERS};
pub use queue::WorkQueue;
pub use registry::{Classification, DigestRegistry};

/// A file whose digest was already registered when it was classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Duplicate {
    /// The duplicate file
    pub path: PathBuf,
    /// The file registered first with the same digest
    pub original: PathBuf,
    /// Shared content digest
    pub digest: Digest,
}
