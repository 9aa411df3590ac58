//! Result collection after the worker pool has finished.
//!
//! A [`ResultCollector`] is only handed out by
//! [`WorkerPool::run`](super::WorkerPool::run) after every worker has
//! returned, so draining it never waits on a producer.

use crossbeam_channel::Receiver;

use super::Duplicate;
use crate::scanner::HashError;

/// Owns the duplicate and error outputs of a finished pool run.
#[derive(Debug)]
pub struct ResultCollector {
    duplicates: Receiver<Duplicate>,
    errors: Receiver<HashError>,
}

impl ResultCollector {
    pub(crate) fn new(duplicates: Receiver<Duplicate>, errors: Receiver<HashError>) -> Self {
        Self { duplicates, errors }
    }

    /// Number of duplicates waiting to be collected.
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.duplicates.len()
    }

    /// Number of per-file errors waiting to be collected.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Drain both outputs into reports sized to what the run produced.
    #[must_use]
    pub fn collect(self) -> (Vec<Duplicate>, Vec<HashError>) {
        let mut duplicates = Vec::with_capacity(self.duplicates.len());
        duplicates.extend(self.duplicates.try_iter());

        let mut errors = Vec::with_capacity(self.errors.len());
        errors.extend(self.errors.try_iter());

        log::debug!(
            "Collected {} duplicates and {} errors",
            duplicates.len(),
            errors.len()
        );
        (duplicates, errors)
    }
}
