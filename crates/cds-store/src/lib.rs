//! Object store abstraction.
//!
//! The validation core reads submitted data files and externally-authored
//! rule files through this narrow interface; the production backend (S3 or
//! similar) lives outside this workspace. Two implementations ship here: a
//! local-filesystem store and an in-memory store for tests and embedding.

mod local;
mod memory;

pub use local::LocalStore;
pub use memory::MemoryStore;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object not found: {path}")]
    NotFound { path: String },
    #[error("store io failure on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("object is not valid utf-8: {path}")]
    NotText { path: String },
}

/// Narrow object-store interface.
///
/// Paths are `/`-separated keys; `list_files` returns every key under the
/// given prefix, sorted, and an unknown prefix yields an empty list rather
/// than an error (mirroring blob-store semantics).
pub trait ObjectStore {
    fn list_files(&self, prefix: &str) -> Result<Vec<String>, StoreError>;
    fn read_to_string(&self, path: &str) -> Result<String, StoreError>;
    fn put(&self, path: &str, bytes: &[u8]) -> Result<(), StoreError>;
}
