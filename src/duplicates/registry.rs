//! Shared digest registry.
//!
//! Maps each digest to the first path that produced it. The whole
//! check-then-insert runs under one lock, so two workers holding the same
//! digest can never both be told they were first. Entries are never
//! replaced or removed during a run.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::scanner::Digest;

/// Outcome of classifying one file against the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// No earlier file had this digest; this path is now the registered one.
    FirstSeen,
    /// Another file already registered this digest.
    Duplicate {
        /// Path registered for the digest
        original: PathBuf,
    },
}

/// Mutex-guarded map from digest to first-seen path.
#[derive(Debug, Default)]
pub struct DigestRegistry {
    entries: Mutex<HashMap<Digest, PathBuf>>,
}

impl DigestRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify `path` by its digest, registering it if the digest is new.
    pub fn classify(&self, digest: Digest, path: &Path) -> Classification {
        let mut entries = self.lock();
        match entries.entry(digest) {
            Entry::Occupied(existing) => Classification::Duplicate {
                original: existing.get().clone(),
            },
            Entry::Vacant(slot) => {
                slot.insert(path.to_path_buf());
                Classification::FirstSeen
            }
        }
    }

    /// Path registered for `digest`, if any.
    #[must_use]
    pub fn get(&self, digest: &Digest) -> Option<PathBuf> {
        self.lock().get(digest).cloned()
    }

    /// Number of distinct digests seen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no digest has been registered yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Consume the registry and return its entries.
    #[must_use]
    pub fn into_entries(self) -> HashMap<Digest, PathBuf> {
        self.entries
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // The map is never left half-updated, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, HashMap<Digest, PathBuf>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
