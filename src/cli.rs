//! Command-line interface definitions for dedup-drive.
//!
//! # Example
//!
//! ```bash
//! # Report duplicates under a directory
//! dedup-drive --directory ~/Drive
//!
//! # Remove them, keeping one copy of each
//! dedup-drive -d ~/Drive --delete=true
//!
//! # Single worker, SHA-256, JSON report
//! dedup-drive -d ~/Drive --workers 1 --algorithm sha256 --output json
//! ```

use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

use crate::scanner::DigestAlgorithm;

/// Find byte-identical files in a directory tree.
///
/// Every file under the directory is hashed; all but the first file seen
/// with each digest are reported as duplicates and, with --delete, removed.
#[derive(Debug, Parser)]
#[command(name = "dedup-drive")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Root directory to scan
    #[arg(short, long, value_name = "PATH")]
    pub directory: Option<PathBuf>,

    /// Delete every duplicate found (one copy of each file is kept)
    #[arg(
        long,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value_t = false,
        default_missing_value = "true",
        value_name = "BOOL"
    )]
    pub delete: bool,

    /// Number of hashing workers [default: 16]
    #[arg(short, long, value_name = "N")]
    pub workers: Option<usize>,

    /// Content digest algorithm [default: blake3]
    #[arg(long, value_enum, value_name = "ALGORITHM")]
    pub algorithm: Option<DigestAlgorithm>,

    /// Move duplicates to the system trash instead of removing them
    #[arg(long)]
    pub trash: bool,

    /// Follow symbolic links during the scan
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Configuration file (TOML); defaults to the platform config directory
    #[arg(long, value_name = "PATH", env = "DEDUP_DRIVE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors and the report
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print fatal errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable listings
    Text,
    /// JSON document for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
