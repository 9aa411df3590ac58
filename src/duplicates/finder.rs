//! Run orchestration: scan, queue, hash, collect.
//!
//! # Overview
//!
//! A run moves through these states:
//!
//! ```text
//! Scanning -> Queued -> Hashing -> Collecting -> Done
//!     |
//!     +-> Failed
//! ```
//!
//! Deletion is a separate step; see [`crate::actions::delete_batch`].
//!
//! # Example
//!
//! ```no_run
//! use dedup_drive::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default().with_workers(8));
//! let report = finder.find_duplicates(Path::new("/home/user/Drive"))?;
//!
//! for dup in &report.duplicates {
//!     println!("{} duplicates {}", dup.path.display(), dup.original.display());
//! }
//! # Ok::<(), dedup_drive::duplicates::FinderError>(())
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::pool::{WorkerPool, DEFAULT_WORKERS};
use super::queue::WorkQueue;
use super::Duplicate;
use crate::progress::ProgressCallback;
use crate::scanner::{DigestAlgorithm, HashError, Hasher, ScanError, Walker, WalkerConfig};

/// Lifecycle of a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Enumerating files under the root
    Scanning,
    /// All paths are in the closed work queue
    Queued,
    /// Workers are hashing and classifying
    Hashing,
    /// Draining duplicate and error outputs
    Collecting,
    /// Removing duplicates
    Deleting,
    /// Run complete
    Done,
    /// Enumeration failed; nothing was hashed
    Failed,
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Scanning => "scanning",
            Self::Queued => "queued",
            Self::Hashing => "hashing",
            Self::Collecting => "collecting",
            Self::Deleting => "deleting",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Number of hashing workers.
    pub workers: usize,
    /// Digest algorithm.
    pub algorithm: DigestAlgorithm,
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("workers", &self.workers)
            .field("algorithm", &self.algorithm)
            .field("walker_config", &self.walker_config)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            algorithm: DigestAlgorithm::default(),
            walker_config: WalkerConfig::default(),
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the worker count (at least one).
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Set the digest algorithm.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: DigestAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }
}

/// Summary statistics from a run.
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    /// Files enumerated by the scanner
    pub total_files: usize,
    /// Distinct digests seen (one surviving file each)
    pub unique_files: usize,
    /// Files classified as duplicates
    pub duplicate_files: usize,
    /// Files that could not be opened or read
    pub failed_files: usize,
    /// Workers used
    pub workers: usize,
    /// Digest algorithm used
    pub algorithm: DigestAlgorithm,
    /// Wall-clock time of the whole run
    pub duration: Duration,
}

/// Result of a completed run.
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Every file whose digest was already registered, in collection order
    pub duplicates: Vec<Duplicate>,
    /// Every file that could not be opened or fully read
    pub errors: Vec<HashError>,
    /// Run statistics
    pub summary: ScanSummary,
}

impl ScanReport {
    /// Paths of all duplicates, ready to hand to the deletion step.
    #[must_use]
    pub fn duplicate_paths(&self) -> Vec<PathBuf> {
        self.duplicates.iter().map(|d| d.path.clone()).collect()
    }

    /// Whether any duplicate was found.
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        !self.duplicates.is_empty()
    }

    /// Whether any file failed to hash.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Errors that end a run.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// Enumeration failed; no files were hashed.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// The worker threads could not be started.
    #[error("Failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Runs the scan-hash-dedup pipeline.
///
/// A finder holds no state between runs and can be reused or shared.
#[derive(Debug, Clone, Default)]
pub struct DuplicateFinder {
    config: FinderConfig,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self { config }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// The configuration this finder runs with.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Find every duplicate file under `root`.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Scan`] if enumeration fails at any point; no
    /// partial report is produced in that case.
    pub fn find_duplicates(&self, root: &Path) -> Result<ScanReport, FinderError> {
        let start_time = Instant::now();
        log::info!("Starting duplicate scan of {}", root.display());

        enter(RunState::Scanning);
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("scanning", 0);
        }
        let scanned = Walker::new(root, self.config.walker_config.clone()).scan();
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("scanning");
        }

        let paths = match scanned {
            Ok(paths) => paths,
            Err(e) => {
                enter(RunState::Failed);
                log::error!("Scan of {} failed: {}", root.display(), e);
                return Err(e.into());
            }
        };

        self.run(paths, start_time)
    }

    /// Hash and classify an already enumerated list of paths.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::ThreadPool`] if the workers cannot be started.
    pub fn find_duplicates_from_paths(
        &self,
        paths: Vec<PathBuf>,
    ) -> Result<ScanReport, FinderError> {
        self.run(paths, Instant::now())
    }

    fn run(&self, paths: Vec<PathBuf>, start_time: Instant) -> Result<ScanReport, FinderError> {
        let total_files = paths.len();

        let queue = WorkQueue::filled(paths);
        enter(RunState::Queued);

        let mut pool = WorkerPool::new(
            self.config.workers,
            Hasher::with_algorithm(self.config.algorithm),
        );
        if let Some(ref callback) = self.config.progress_callback {
            pool = pool.with_progress_callback(callback.clone());
        }

        enter(RunState::Hashing);
        let output = pool.run(queue)?;

        enter(RunState::Collecting);
        let unique_files = output.registry.len();
        let (duplicates, errors) = output.collector.collect();

        let summary = ScanSummary {
            total_files,
            unique_files,
            duplicate_files: duplicates.len(),
            failed_files: errors.len(),
            workers: pool.workers(),
            algorithm: self.config.algorithm,
            duration: start_time.elapsed(),
        };
        enter(RunState::Done);

        log::info!(
            "Scan complete: {} files, {} unique, {} duplicates, {} errors in {:.2?}",
            summary.total_files,
            summary.unique_files,
            summary.duplicate_files,
            summary.failed_files,
            summary.duration
        );

        Ok(ScanReport {
            duplicates,
            errors,
            summary,
        })
    }
}

fn enter(state: RunState) {
    log::debug!("Run state: {}", state);
}
