//! Pre-filled, closed work queue.
//!
//! # Overview
//!
//! [`WorkQueue`] is a bounded channel whose capacity equals the number of
//! discovered files. It is filled completely and its only sender is dropped
//! before any worker starts. From then on the queue is closed: `take`
//! blocks while items remain and returns `None` only once the queue is both
//! closed and drained. Workers never look at the queue length to decide
//! when to stop.

use std::path::PathBuf;

use crossbeam_channel::{bounded, Receiver};

/// Fixed-capacity queue of file paths, closed for writing at construction.
#[derive(Debug, Clone)]
pub struct WorkQueue {
    receiver: Receiver<PathBuf>,
    capacity: usize,
}

impl WorkQueue {
    /// Build a queue holding exactly `paths`, in order, and close it.
    #[must_use]
    pub fn filled(paths: Vec<PathBuf>) -> Self {
        let capacity = paths.len();
        let (sender, receiver) = bounded(capacity);

        for path in paths {
            // Capacity matches the path count and `receiver` is alive, so this cannot fail.
            let _ = sender.try_send(path);
        }
        drop(sender);

        log::debug!("Work queue filled with {} paths and closed", capacity);
        Self { receiver, capacity }
    }

    /// Take the next path.
    ///
    /// Returns `None` once every path has been handed out.
    pub fn take(&self) -> Option<PathBuf> {
        self.receiver.recv().ok()
    }

    /// Number of paths the queue was filled with.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Paths not yet taken. Informational only.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.receiver.len()
    }
}
