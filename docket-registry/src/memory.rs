//! In-memory registry backend for tests and single-process runs.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::record::{FileRecord, NewFileRecord};
use crate::{FileRegistry, Result};

/// A [`FileRegistry`] held entirely in memory.
///
/// State lives for the process lifetime only.
#[derive(Debug, Default)]
pub struct InMemoryFileRegistry {
    files: RwLock<HashMap<String, FileRecord>>,
}

impl InMemoryFileRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FileRegistry for InMemoryFileRegistry {
    async fn register(&self, new: NewFileRecord) -> Result<FileRecord> {
        let record = FileRecord::stamp(new);
        let mut files = self.files.write().await;
        files.insert(record.file_id.clone(), record.clone());
        debug!(file_id = %record.file_id, filename = %record.filename, "registered file");
        Ok(record)
    }

    async fn get(&self, file_id: &str) -> Result<Option<FileRecord>> {
        let files = self.files.read().await;
        Ok(files.get(file_id).cloned())
    }

    async fn list(&self) -> Result<HashMap<String, FileRecord>> {
        let files = self.files.read().await;
        Ok(files.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use docket_core::DocumentType;

    fn new_record(file_id: &str) -> NewFileRecord {
        NewFileRecord {
            file_id: file_id.to_string(),
            filename: "report.pdf".to_string(),
            content_type: DocumentType::Pdf,
            size: 2048,
            file_path: "/uploads/report.pdf".to_string(),
            description: Some("quarterly report".to_string()),
        }
    }

    #[tokio::test]
    async fn registered_record_round_trips_exactly() {
        let registry = InMemoryFileRegistry::new();
        let new = new_record("f1");
        registry.register(new.clone()).await.unwrap();

        let fetched = registry.get("f1").await.unwrap().unwrap();
        assert_eq!(fetched.file_id, new.file_id);
        assert_eq!(fetched.filename, new.filename);
        assert_eq!(fetched.content_type, new.content_type);
        assert_eq!(fetched.size, new.size);
        assert_eq!(fetched.file_path, new.file_path);
        assert_eq!(fetched.description, new.description);

        assert!(registry.list().await.unwrap().contains_key("f1"));
    }

    #[tokio::test]
    async fn missing_file_id_returns_none() {
        let registry = InMemoryFileRegistry::new();
        assert!(registry.get("absent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn re_registration_replaces_the_record() {
        let registry = InMemoryFileRegistry::new();
        registry.register(new_record("f1")).await.unwrap();

        let mut updated = new_record("f1");
        updated.description = Some("revised".to_string());
        registry.register(updated).await.unwrap();

        let fetched = registry.get("f1").await.unwrap().unwrap();
        assert_eq!(fetched.description.as_deref(), Some("revised"));
        assert_eq!(registry.list().await.unwrap().len(), 1);
    }
}
