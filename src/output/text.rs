//! Human-readable report output.
//!
//! ```text
//! Errors (1):
//!   Permission denied: /drive/locked.bin
//!
//! Duplicates (2):
//!   /drive/b.txt (duplicate of /drive/a.txt)
//!   /drive/c.txt (duplicate of /drive/a.txt)
//!
//! 4 files scanned: 1 unique, 2 duplicates, 1 errors (16 workers, blake3, 12ms)
//! ```

use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use crate::actions::{BatchDeleteResult, DeleteProgressCallback};
use crate::duplicates::ScanReport;

/// Guidance printed after every text report when deletion was not requested.
pub const DELETE_HINT: &str = "To delete the duplicate files run with --delete=true";

/// Text formatter for a [`ScanReport`].
#[derive(Debug)]
pub struct TextOutput<'a> {
    report: &'a ScanReport,
}

impl<'a> TextOutput<'a> {
    /// Wrap a report for printing.
    #[must_use]
    pub fn new(report: &'a ScanReport) -> Self {
        Self { report }
    }

    /// Write the error listing, the duplicate listing and the summary line.
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying writer.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "Errors ({}):", self.report.errors.len())?;
        for error in &self.report.errors {
            writeln!(writer, "  {}", error)?;
        }
        writeln!(writer)?;

        writeln!(writer, "Duplicates ({}):", self.report.duplicates.len())?;
        for dup in &self.report.duplicates {
            writeln!(
                writer,
                "  {} (duplicate of {})",
                dup.path.display(),
                dup.original.display()
            )?;
        }
        writeln!(writer)?;

        let s = &self.report.summary;
        writeln!(
            writer,
            "{} files scanned: {} unique, {} duplicates, {} errors ({} workers, {}, {:.2?})",
            s.total_files,
            s.unique_files,
            s.duplicate_files,
            s.failed_files,
            s.workers,
            s.algorithm,
            s.duration
        )
    }

    /// Write the report into a string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_to(&mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

/// Prints one line per deletion attempt as the batch runs.
///
/// ```text
/// Deleting /drive/b.txt
/// Deleting /drive/c.txt
/// Error deleting /drive/c.txt: permission denied: /drive/c.txt
/// Deleted 1 file(s), 1 failed, freed 6 bytes
/// ```
pub struct TextDeleteReporter<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> TextDeleteReporter<W> {
    /// Report to the given writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn line(&self, args: std::fmt::Arguments<'_>) {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writer.write_fmt(args).and_then(|()| writer.write_all(b"\n")) {
            log::debug!("Failed to write deletion output: {}", e);
        }
    }
}

impl<W: Write + Send> DeleteProgressCallback for TextDeleteReporter<W> {
    fn on_before_delete(&self, path: &Path, _index: usize, _total: usize) {
        self.line(format_args!("Deleting {}", path.display()));
    }

    fn on_delete_success(&self, _path: &Path, _size: u64) {}

    fn on_delete_failure(&self, path: &Path, error: &str) {
        self.line(format_args!("Error deleting {}: {}", path.display(), error));
    }

    fn on_complete(&self, result: &BatchDeleteResult) {
        self.line(format_args!("{}", result.summary()));
    }
}
