//! Output formatters for run reports.
//!
//! - [`TextOutput`] prints the human-readable listings
//! - [`JsonOutput`] emits a single JSON document for scripting
//!
//! # Example
//!
//! ```no_run
//! use dedup_drive::duplicates::DuplicateFinder;
//! use dedup_drive::output::TextOutput;
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let report = finder.find_duplicates(Path::new(".")).unwrap();
//!
//! TextOutput::new(&report).write_to(&mut std::io::stdout()).unwrap();
//! ```

pub mod json;
pub mod text;

pub use json::{JsonOutput, JsonOutputError};
pub use text::{TextDeleteReporter, TextOutput};
