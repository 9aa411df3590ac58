//! Directory walker built on walkdir.
//!
//! # Overview
//!
//! [`Walker`] enumerates every non-directory entry under a root path into
//! an ordered list. Siblings are visited in file-name order, so the same
//! tree always produces the same list.
//!
//! The walk is all-or-nothing: the first traversal error (permission
//! denied, broken symlink, symlink loop, I/O failure) aborts it and the
//! paths collected so far are dropped. Symlinks are never returned; see
//! [`Walker::scan`].
//!
//! # Example
//!
//! ```no_run
//! use dedup_drive::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Drive"), WalkerConfig::default());
//! let files = walker.scan()?;
//! for path in &files {
//!     println!("{}", path.display());
//! }
//! # Ok::<(), dedup_drive::scanner::ScanError>(())
//! ```

use std::collections::HashSet;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::{ScanError, WalkerConfig};

/// Directory walker for file discovery.
#[derive(Debug, Clone)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
}

impl Walker {
    /// Create a new walker for the given path.
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
        }
    }

    /// Root path this walker scans.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the tree and return every file path in traversal order.
    ///
    /// Empty files are included. Directories are not. Symlinks are never
    /// returned themselves, so a link can neither stand in for the file it
    /// points at nor be removed in its place:
    ///
    /// - a symlink to a file is skipped in both modes
    /// - a symlink to a directory is skipped unless `follow_symlinks` is
    ///   set, in which case the files below it are returned
    /// - a dangling symlink aborts the walk
    ///
    /// When following links, a file reachable through more than one path
    /// is returned once, under the first path in walk order.
    ///
    /// # Errors
    ///
    /// Returns the first [`ScanError`] encountered. No partial list is
    /// returned.
    pub fn scan(&self) -> Result<Vec<PathBuf>, ScanError> {
        self.validate_root()?;

        let mut files = Vec::new();
        let mut seen = HashSet::new();
        let walk = WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name();

        for entry in walk {
            let entry = entry.map_err(|e| self.convert_walk_error(e))?;
            let file_type = entry.file_type();

            if file_type.is_dir() {
                continue;
            }

            if entry.path_is_symlink() {
                // Unfollowed links still have to resolve.
                if file_type.is_symlink() {
                    self.check_symlink_target(entry.path())?;
                }
                log::debug!("Skipping symlink: {}", entry.path().display());
                continue;
            }

            if self.config.follow_symlinks {
                let real = fs::canonicalize(entry.path())
                    .map_err(|e| self.io_error(entry.path(), e))?;
                if !seen.insert(real) {
                    log::debug!("Already enumerated: {}", entry.path().display());
                    continue;
                }
            }

            files.push(entry.into_path());
        }

        log::debug!(
            "Enumerated {} files under {}",
            files.len(),
            self.root.display()
        );
        Ok(files)
    }

    /// Make sure the root exists and is a directory before walking.
    fn validate_root(&self) -> Result<(), ScanError> {
        let metadata = fs::metadata(&self.root).map_err(|e| self.io_error(&self.root, e))?;
        if !metadata.is_dir() {
            return Err(ScanError::NotADirectory(self.root.clone()));
        }
        Ok(())
    }

    /// Fail if an unfollowed symlink does not resolve.
    fn check_symlink_target(&self, path: &Path) -> Result<(), ScanError> {
        match fs::metadata(path) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::warn!("Broken symlink: {}", path.display());
                Err(ScanError::BrokenSymlink(path.to_path_buf()))
            }
            Err(e) => Err(self.io_error(path, e)),
        }
    }

    fn convert_walk_error(&self, error: walkdir::Error) -> ScanError {
        let path = error
            .path()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);

        if let Some(ancestor) = error.loop_ancestor() {
            log::warn!("Symlink loop: {}", path.display());
            return ScanError::Loop {
                ancestor: ancestor.to_path_buf(),
                path,
            };
        }

        let is_link = fs::symlink_metadata(&path).is_ok_and(|m| m.file_type().is_symlink());
        let message = error.to_string();
        match error.into_io_error() {
            Some(e) if e.kind() == ErrorKind::NotFound && is_link => {
                log::warn!("Broken symlink: {}", path.display());
                ScanError::BrokenSymlink(path)
            }
            Some(e) => self.io_error(&path, e),
            None => self.io_error(&path, io::Error::other(message)),
        }
    }

    fn io_error(&self, path: &Path, error: io::Error) -> ScanError {
        log::warn!("Walk failed at {}: {}", path.display(), error);
        match error.kind() {
            ErrorKind::PermissionDenied => ScanError::PermissionDenied(path.to_path_buf()),
            ErrorKind::NotFound => ScanError::NotFound(path.to_path_buf()),
            _ => ScanError::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}
