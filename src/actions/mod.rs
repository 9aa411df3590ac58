//! File actions module.
//!
//! Currently a single action: removing the duplicates a run reported,
//! either permanently (default) or by moving them to the system trash.
//!
//! ```no_run
//! use dedup_drive::actions::{delete_batch, DeleteConfig, NoCallback};
//! use std::path::PathBuf;
//!
//! let duplicates = vec![PathBuf::from("/drive/copy of report.pdf")];
//! let result = delete_batch::<NoCallback>(&duplicates, &DeleteConfig::trash(), None);
//! println!("{}", result.summary());
//! ```

pub mod delete;

// Re-export commonly used types
pub use delete::{
    delete_batch, delete_file, delete_to_trash, permanent_delete, BatchDeleteResult,
    DeleteConfig, DeleteError, DeleteProgressCallback, DeleteResult, NoCallback,
};
