//! Duplicate removal.
//!
//! # Overview
//!
//! [`delete_batch`] removes every path it is given, one at a time. A failed
//! deletion is logged, reported to the callback and recorded; the batch
//! always moves on to the next path. Nothing is retried.
//!
//! Removal is permanent by default. With [`DeleteConfig::trash`] set, files
//! are moved to the system trash instead.
//!
//! There is no journal: if the process dies mid-batch, the files already
//! removed stay removed and the rest stay in place.
//!
//! # Example
//!
//! ```no_run
//! use dedup_drive::actions::delete::{delete_batch, DeleteConfig, NoCallback};
//! use std::path::PathBuf;
//!
//! let paths = vec![PathBuf::from("/drive/copy.txt")];
//! let result = delete_batch::<NoCallback>(&paths, &DeleteConfig::default(), None);
//! println!("{}", result.summary());
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Error type for deletion operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Trash operation failed.
    #[error("trash operation failed for {path}: {message}")]
    TrashFailed { path: PathBuf, message: String },

    /// Permanent delete operation failed.
    #[error("permanent delete failed for {path}: {source}")]
    PermanentDeleteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    /// Get the path associated with this error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::TrashFailed { path: p, .. }
            | Self::PermanentDeleteFailed { path: p, .. }
            | Self::Io { path: p, .. } => p,
        }
    }

    fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}

/// Result of a successful deletion operation.
#[derive(Debug, Clone)]
pub struct DeleteResult {
    /// Path that was deleted.
    pub path: PathBuf,
    /// Size of the deleted file in bytes.
    pub size: u64,
    /// Whether the file went to the trash (false means permanently removed).
    pub trashed: bool,
}

impl DeleteResult {
    /// Create a new delete result.
    #[must_use]
    pub fn new(path: PathBuf, size: u64, trashed: bool) -> Self {
        Self {
            path,
            size,
            trashed,
        }
    }
}

/// Results of a batch deletion operation.
#[derive(Debug, Clone, Default)]
pub struct BatchDeleteResult {
    /// Successfully deleted files.
    pub successes: Vec<DeleteResult>,
    /// Failed deletions with their errors.
    pub failures: Vec<(PathBuf, String)>,
    /// Total bytes freed.
    pub bytes_freed: u64,
}

impl BatchDeleteResult {
    /// Number of successful deletions.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    /// Number of failed deletions.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Total number of attempted deletions.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    /// Check if all deletions succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human-readable summary of the operation.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.all_succeeded() {
            format!(
                "Deleted {} file(s), freed {} bytes",
                self.success_count(),
                self.bytes_freed
            )
        } else {
            format!(
                "Deleted {} file(s), {} failed, freed {} bytes",
                self.success_count(),
                self.failure_count(),
                self.bytes_freed
            )
        }
    }
}

/// Configuration for deletion operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteConfig {
    /// Move files to the system trash instead of removing them.
    pub trash: bool,
}

impl DeleteConfig {
    /// Config for permanent removal.
    #[must_use]
    pub fn permanent() -> Self {
        Self { trash: false }
    }

    /// Config for moving files to the trash.
    #[must_use]
    pub fn trash() -> Self {
        Self { trash: true }
    }
}

/// Callback trait for deletion progress reporting.
pub trait DeleteProgressCallback: Send + Sync {
    /// Called before each file deletion.
    fn on_before_delete(&self, path: &Path, index: usize, total: usize);

    /// Called after successful deletion.
    fn on_delete_success(&self, path: &Path, size: u64);

    /// Called after failed deletion.
    fn on_delete_failure(&self, path: &Path, error: &str);

    /// Called when batch operation completes.
    fn on_complete(&self, result: &BatchDeleteResult);
}

/// Callback that ignores every event, for callers that pass `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCallback;

impl DeleteProgressCallback for NoCallback {
    fn on_before_delete(&self, _: &Path, _: usize, _: usize) {}
    fn on_delete_success(&self, _: &Path, _: u64) {}
    fn on_delete_failure(&self, _: &Path, _: &str) {}
    fn on_complete(&self, _: &BatchDeleteResult) {}
}

fn file_size(path: &Path) -> Result<u64, DeleteError> {
    fs::symlink_metadata(path)
        .map(|m| m.len())
        .map_err(|e| DeleteError::from_io(path, e))
}

/// Move a single file to the system trash.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if its metadata can't be read
/// - `TrashFailed` if the trash operation fails
pub fn delete_to_trash(path: &Path) -> Result<DeleteResult, DeleteError> {
    let size = file_size(path)?;

    trash::delete(path).map_err(|e| {
        log::error!("Trash operation failed for {}: {}", path.display(), e);
        DeleteError::TrashFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    log::info!("Moved to trash: {} ({} bytes)", path.display(), size);
    Ok(DeleteResult::new(path.to_path_buf(), size, true))
}

/// Permanently remove a single file.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if its metadata can't be read
/// - `PermanentDeleteFailed` if the removal fails
pub fn permanent_delete(path: &Path) -> Result<DeleteResult, DeleteError> {
    let size = file_size(path)?;

    fs::remove_file(path).map_err(|e| {
        log::error!("Permanent delete failed for {}: {}", path.display(), e);
        DeleteError::PermanentDeleteFailed {
            path: path.to_path_buf(),
            source: e,
        }
    })?;

    log::info!("Deleted: {} ({} bytes)", path.display(), size);
    Ok(DeleteResult::new(path.to_path_buf(), size, false))
}

/// Delete one file according to `config`.
///
/// # Errors
///
/// See [`delete_to_trash`] and [`permanent_delete`].
pub fn delete_file(path: &Path, config: &DeleteConfig) -> Result<DeleteResult, DeleteError> {
    if config.trash {
        delete_to_trash(path)
    } else {
        permanent_delete(path)
    }
}

/// Delete every path in `paths`, continuing past failures.
///
/// # Example
///
/// ```no_run
/// use dedup_drive::actions::delete::{delete_batch, DeleteConfig, NoCallback};
/// use std::path::PathBuf;
///
/// let paths = vec![PathBuf::from("/dup1.txt"), PathBuf::from("/dup2.txt")];
/// let result = delete_batch::<NoCallback>(&paths, &DeleteConfig::default(), None);
/// assert_eq!(result.total_count(), 2);
/// ```
pub fn delete_batch<C: DeleteProgressCallback>(
    paths: &[PathBuf],
    config: &DeleteConfig,
    callback: Option<&C>,
) -> BatchDeleteResult {
    let mut result = BatchDeleteResult::default();
    let total = paths.len();

    for (index, path) in paths.iter().enumerate() {
        if let Some(cb) = callback {
            cb.on_before_delete(path, index, total);
        }

        match delete_file(path, config) {
            Ok(del) => {
                result.bytes_freed += del.size;
                if let Some(cb) = callback {
                    cb.on_delete_success(path, del.size);
                }
                result.successes.push(del);
            }
            Err(e) => {
                let error_msg = e.to_string();
                log::warn!("Failed to delete {}: {}", path.display(), error_msg);

                if let Some(cb) = callback {
                    cb.on_delete_failure(path, &error_msg);
                }
                result.failures.push((path.clone(), error_msg));
            }
        }
    }

    if let Some(cb) = callback {
        cb.on_complete(&result);
    }

    log::info!("{}", result.summary());
    result
}
