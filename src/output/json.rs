//! JSON output formatter for run reports.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "duplicates": [
//!     {
//!       "path": "/drive/b.txt",
//!       "original": "/drive/a.txt",
//!       "digest": "ea8f163db38682925e4491c5e58d4bb3506ef8c14eb78a86e908c5624a67200f"
//!     }
//!   ],
//!   "errors": [
//!     { "path": "/drive/locked.bin", "error": "Permission denied: /drive/locked.bin" }
//!   ],
//!   "summary": {
//!     "total_files": 4,
//!     "unique_files": 1,
//!     "duplicate_files": 2,
//!     "failed_files": 1,
//!     "workers": 16,
//!     "algorithm": "blake3",
//!     "duration_ms": 12
//!   },
//!   "deletion": {
//!     "deleted": ["/drive/b.txt"],
//!     "failed": [{ "path": "/drive/c.txt", "error": "permission denied: /drive/c.txt" }],
//!     "bytes_freed": 6
//!   }
//! }
//! ```
//!
//! `deletion` is only present when deletion was requested.

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::actions::BatchDeleteResult;
use crate::duplicates::{Duplicate, ScanReport, ScanSummary};
use crate::scanner::{digest_to_hex, DigestAlgorithm, HashError};

/// A single duplicate in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicate {
    /// The file classified as a duplicate
    pub path: String,
    /// The registered file it duplicates
    pub original: String,
    /// Content digest as lowercase hex
    pub digest: String,
}

impl From<&Duplicate> for JsonDuplicate {
    fn from(dup: &Duplicate) -> Self {
        Self {
            path: path_string(&dup.path),
            original: path_string(&dup.original),
            digest: digest_to_hex(&dup.digest),
        }
    }
}

/// A per-file failure in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonFileError {
    /// The file that failed
    pub path: String,
    /// Human-readable cause
    pub error: String,
}

impl From<&HashError> for JsonFileError {
    fn from(err: &HashError) -> Self {
        Self {
            path: path_string(err.path()),
            error: err.to_string(),
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Files enumerated by the scanner
    pub total_files: usize,
    /// Distinct digests seen
    pub unique_files: usize,
    /// Files classified as duplicates
    pub duplicate_files: usize,
    /// Files that could not be read
    pub failed_files: usize,
    /// Workers used
    pub workers: usize,
    /// Digest algorithm used
    pub algorithm: DigestAlgorithm,
    /// Run duration in milliseconds
    pub duration_ms: u64,
}

impl From<&ScanSummary> for JsonSummary {
    fn from(summary: &ScanSummary) -> Self {
        Self {
            total_files: summary.total_files,
            unique_files: summary.unique_files,
            duplicate_files: summary.duplicate_files,
            failed_files: summary.failed_files,
            workers: summary.workers,
            algorithm: summary.algorithm,
            duration_ms: summary.duration.as_millis() as u64,
        }
    }
}

/// Deletion outcome in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDeletion {
    /// Files removed
    pub deleted: Vec<String>,
    /// Files that could not be removed
    pub failed: Vec<JsonFileError>,
    /// Bytes reclaimed
    pub bytes_freed: u64,
}

impl From<&BatchDeleteResult> for JsonDeletion {
    fn from(result: &BatchDeleteResult) -> Self {
        Self {
            deleted: result
                .successes
                .iter()
                .map(|r| path_string(&r.path))
                .collect(),
            failed: result
                .failures
                .iter()
                .map(|(path, error)| JsonFileError {
                    path: path_string(path),
                    error: error.clone(),
                })
                .collect(),
            bytes_freed: result.bytes_freed,
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Every duplicate found
    pub duplicates: Vec<JsonDuplicate>,
    /// Every per-file failure
    pub errors: Vec<JsonFileError>,
    /// Run statistics
    pub summary: JsonSummary,
    /// Deletion outcome, when deletion ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deletion: Option<JsonDeletion>,
}

impl JsonOutput {
    /// Create a JSON output from a report.
    ///
    /// # Example
    ///
    /// ```
    /// use dedup_drive::duplicates::ScanReport;
    /// use dedup_drive::output::JsonOutput;
    ///
    /// let output = JsonOutput::new(&ScanReport::default());
    /// assert!(output.duplicates.is_empty());
    /// assert!(output.deletion.is_none());
    /// ```
    #[must_use]
    pub fn new(report: &ScanReport) -> Self {
        Self {
            duplicates: report.duplicates.iter().map(JsonDuplicate::from).collect(),
            errors: report.errors.iter().map(JsonFileError::from).collect(),
            summary: JsonSummary::from(&report.summary),
            deletion: None,
        }
    }

    /// Attach the outcome of a deletion batch.
    #[must_use]
    pub fn with_deletion(mut self, result: &BatchDeleteResult) -> Self {
        self.deletion = Some(JsonDeletion::from(result));
        self
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer, followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
