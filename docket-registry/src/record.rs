//! File metadata records.

use chrono::{DateTime, Utc};
use docket_core::DocumentType;
use serde::{Deserialize, Serialize};

/// Metadata captured at upload time, before the timestamp is stamped.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFileRecord {
    /// Unique identifier generated for the upload.
    pub file_id: String,
    /// Original filename as uploaded.
    pub filename: String,
    /// Document format of the upload.
    pub content_type: DocumentType,
    /// Size in bytes.
    pub size: u64,
    /// Where the uploaded bytes were stored.
    pub file_path: String,
    /// Generated description, when pipeline A produced one.
    pub description: Option<String>,
}

/// A registered file. Immutable after creation except by re-registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Unique identifier generated for the upload.
    pub file_id: String,
    /// Original filename as uploaded.
    pub filename: String,
    /// Document format of the upload.
    pub content_type: DocumentType,
    /// Size in bytes.
    pub size: u64,
    /// Where the uploaded bytes were stored.
    pub file_path: String,
    /// Generated description, when pipeline A produced one.
    pub description: Option<String>,
    /// When the file was registered.
    pub uploaded_at: DateTime<Utc>,
}

impl FileRecord {
    /// Stamp a [`NewFileRecord`] with the current time.
    pub(crate) fn stamp(new: NewFileRecord) -> Self {
        Self {
            file_id: new.file_id,
            filename: new.filename,
            content_type: new.content_type,
            size: new.size,
            file_path: new.file_path,
            description: new.description,
            uploaded_at: Utc::now(),
        }
    }
}
