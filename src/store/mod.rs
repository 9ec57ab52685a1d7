//! Working-copy store - where unpublished edits live between sessions.
//!
//! The sync core only needs `get`, `set` and `remove` on string keys, so any
//! key-value backend works. Two are provided: an in-memory map and a JSON
//! file under the data directory.

mod file;
mod memory;
mod paths;

use miette::Diagnostic;
use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use paths::{get_data_dir, get_store_path};

/// Errors raised by a store backend.
#[derive(Error, Diagnostic, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    #[diagnostic(code(folio::store::io))]
    Io(#[from] std::io::Error),

    #[error("Store file is corrupt: {0}")]
    #[diagnostic(
        code(folio::store::corrupt),
        help("Delete or repair the working-copy file; unpublished edits in it are lost.")
    )]
    Corrupt(#[from] serde_json::Error),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Key-value persistence for the working copy.
pub trait WorkingCopyStore: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> StoreResult<()>;
}
