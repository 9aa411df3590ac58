//! Fixed-size worker pool that hashes and classifies queued files.
//!
//! # Overview
//!
//! [`WorkerPool::run`] builds a dedicated rayon pool with one thread per
//! worker and spawns the workers inside a rayon scope. The scope does not
//! return until every worker has returned, which is the barrier between
//! hashing and collection.
//!
//! Each worker loops:
//! 1. take the next path (stop when the queue is closed and drained)
//! 2. open and digest the file
//! 3. classify the digest against the shared [`DigestRegistry`]
//! 4. send duplicates to the duplicate output, failures to the error output
//!
//! A failing file is sent to the error output and skipped. It never stops
//! the worker or the pool.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam_channel::{bounded, Sender};

use super::collector::ResultCollector;
use super::queue::WorkQueue;
use super::registry::{Classification, DigestRegistry};
use super::{Duplicate, FinderError};
use crate::progress::ProgressCallback;
use crate::scanner::{digest_to_hex, HashError, Hasher};

/// Default number of workers.
pub const DEFAULT_WORKERS: usize = 16;

/// Everything a finished pool run leaves behind.
#[derive(Debug)]
pub struct PoolOutput {
    /// Digest registry, read-only from here on
    pub registry: DigestRegistry,
    /// Duplicate and error outputs, ready to drain
    pub collector: ResultCollector,
}

/// A fixed number of hashing workers.
#[derive(Clone)]
pub struct WorkerPool {
    workers: usize,
    hasher: Hasher,
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("workers", &self.workers)
            .field("hasher", &self.hasher)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl WorkerPool {
    /// Create a pool with `workers` workers (at least one).
    #[must_use]
    pub fn new(workers: usize, hasher: Hasher) -> Self {
        Self {
            workers: workers.max(1),
            hasher,
            progress_callback: None,
        }
    }

    /// Report each processed file to `callback`.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Number of workers this pool runs.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Drain `queue` with all workers and wait for every one of them.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::ThreadPool`] if the worker threads cannot be
    /// started. Per-file failures are not errors here; they are in the
    /// returned collector.
    pub fn run(&self, queue: WorkQueue) -> Result<PoolOutput, FinderError> {
        let total = queue.capacity();
        let registry = DigestRegistry::new();
        let processed = AtomicUsize::new(0);

        // Each file yields at most one message, so sends never block.
        let (duplicate_tx, duplicate_rx) = bounded(total);
        let (error_tx, error_rx) = bounded(total);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("dedup-worker-{i}"))
            .build()?;

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_start("hashing", total);
        }
        log::info!("Hashing {} files with {} workers", total, self.workers);

        pool.scope(|scope| {
            for id in 0..self.workers {
                let worker = Worker {
                    id,
                    queue: &queue,
                    registry: &registry,
                    hasher: self.hasher,
                    duplicates: duplicate_tx.clone(),
                    errors: error_tx.clone(),
                    processed: &processed,
                    progress_callback: self.progress_callback.as_deref(),
                };
                scope.spawn(move |_| worker.run());
            }
        });

        // Workers dropped their clones when they returned.
        drop(duplicate_tx);
        drop(error_tx);

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_end("hashing");
        }
        log::debug!(
            "All {} workers finished; {} distinct digests",
            self.workers,
            registry.len()
        );

        Ok(PoolOutput {
            registry,
            collector: ResultCollector::new(duplicate_rx, error_rx),
        })
    }
}

/// One worker's view of the shared run state.
struct Worker<'a> {
    id: usize,
    queue: &'a WorkQueue,
    registry: &'a DigestRegistry,
    hasher: Hasher,
    duplicates: Sender<Duplicate>,
    errors: Sender<HashError>,
    processed: &'a AtomicUsize,
    progress_callback: Option<&'a dyn ProgressCallback>,
}

impl Worker<'_> {
    fn run(self) {
        let mut handled = 0usize;
        while let Some(path) = self.queue.take() {
            if let Some(callback) = self.progress_callback {
                let current = self.processed.fetch_add(1, Ordering::Relaxed) + 1;
                callback.on_progress(current, path.to_string_lossy().as_ref());
            }
            self.process(path);
            handled += 1;
        }
        log::trace!("Worker {} done after {} files", self.id, handled);
    }

    fn process(&self, path: std::path::PathBuf) {
        let digest = match self.hasher.digest_file(&path) {
            Ok(digest) => digest,
            Err(e) => {
                log::warn!("Failed to hash {}: {}", path.display(), e);
                if self.errors.send(e).is_err() {
                    log::error!("Error output closed before the pool finished");
                }
                return;
            }
        };

        match self.registry.classify(digest, &path) {
            Classification::FirstSeen => {}
            Classification::Duplicate { original } => {
                log::debug!(
                    "Duplicate {} of {} ({})",
                    path.display(),
                    original.display(),
                    digest_to_hex(&digest)
                );
                let duplicate = Duplicate {
                    path,
                    original,
                    digest,
                };
                if self.duplicates.send(duplicate).is_err() {
                    log::error!("Duplicate output closed before the pool finished");
                }
            }
        }
    }
}
