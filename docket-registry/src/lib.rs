//! Uploaded-file metadata repository.
//!
//! One [`FileRegistry`] trait over a keyed store, with an in-memory backend
//! for tests and a JSON-file backend for production. Records are created on
//! upload and never deleted; re-registering a file id replaces its record.

mod error;
mod json;
mod memory;
mod record;

pub use error::{RegistryError, Result};
pub use json::JsonFileRegistry;
pub use memory::InMemoryFileRegistry;
pub use record::{FileRecord, NewFileRecord};

use std::collections::HashMap;

use async_trait::async_trait;

/// A keyed store of uploaded-file metadata.
#[async_trait]
pub trait FileRegistry: Send + Sync {
    /// Register a file, stamping the upload timestamp. Registration is a
    /// single insert; re-registration replaces the existing record.
    async fn register(&self, new: NewFileRecord) -> Result<FileRecord>;

    /// Look up a single record by file id.
    async fn get(&self, file_id: &str) -> Result<Option<FileRecord>>;

    /// All registered files, keyed by file id.
    async fn list(&self) -> Result<HashMap<String, FileRecord>>;
}
