//! JSON-file registry backend.
//!
//! The whole registry lives in one JSON document on local disk. Writes go
//! through a temp file and rename so a crash never leaves a half-written
//! registry; a corrupt or missing file is treated as empty state and
//! silently reset.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::record::{FileRecord, NewFileRecord};
use crate::{FileRegistry, Result};

/// Current on-disk format version.
const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct RegistryFile {
    version: u32,
    files: HashMap<String, FileRecord>,
}

impl Default for RegistryFile {
    fn default() -> Self {
        Self { version: FORMAT_VERSION, files: HashMap::new() }
    }
}

/// A [`FileRegistry`] persisted as a single JSON document.
pub struct JsonFileRegistry {
    path: PathBuf,
    // Serializes read-modify-write cycles across concurrent registrations.
    write_lock: Mutex<()>,
}

impl JsonFileRegistry {
    /// Create a registry backed by the given file path. The file is created
    /// on first registration.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> RegistryFile {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(_) => return RegistryFile::default(),
        };

        match serde_json::from_slice::<RegistryFile>(&bytes) {
            Ok(file) if file.version == FORMAT_VERSION => file,
            Ok(file) => {
                warn!(
                    path = %self.path.display(),
                    version = file.version,
                    "unknown registry format version, resetting"
                );
                RegistryFile::default()
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "corrupt registry file, resetting");
                RegistryFile::default()
            }
        }
    }

    async fn save(&self, file: &RegistryFile) -> Result<()> {
        let json = serde_json::to_string_pretty(file)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl FileRegistry for JsonFileRegistry {
    async fn register(&self, new: NewFileRecord) -> Result<FileRecord> {
        let _guard = self.write_lock.lock().await;

        let record = FileRecord::stamp(new);
        let mut file = self.load().await;
        file.files.insert(record.file_id.clone(), record.clone());
        self.save(&file).await?;

        debug!(file_id = %record.file_id, path = %self.path.display(), "registered file");
        Ok(record)
    }

    async fn get(&self, file_id: &str) -> Result<Option<FileRecord>> {
        Ok(self.load().await.files.remove(file_id))
    }

    async fn list(&self) -> Result<HashMap<String, FileRecord>> {
        Ok(self.load().await.files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use docket_core::DocumentType;

    fn new_record(file_id: &str) -> NewFileRecord {
        NewFileRecord {
            file_id: file_id.to_string(),
            filename: "notes.docx".to_string(),
            content_type: DocumentType::Docx,
            size: 512,
            file_path: "/uploads/notes.docx".to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn records_survive_a_new_handle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("files.json");

        let registry = JsonFileRegistry::new(&path);
        registry.register(new_record("f1")).await.unwrap();
        drop(registry);

        let reopened = JsonFileRegistry::new(&path);
        let fetched = reopened.get("f1").await.unwrap().unwrap();
        assert_eq!(fetched.filename, "notes.docx");
        assert_eq!(fetched.content_type, DocumentType::Docx);
    }

    #[tokio::test]
    async fn corrupt_file_is_treated_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("files.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        let registry = JsonFileRegistry::new(&path);
        assert!(registry.list().await.unwrap().is_empty());

        // Registration still works after the reset.
        registry.register(new_record("f1")).await.unwrap();
        assert_eq!(registry.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn missing_file_is_treated_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let registry = JsonFileRegistry::new(dir.path().join("absent.json"));
        assert!(registry.list().await.unwrap().is_empty());
        assert!(registry.get("f1").await.unwrap().is_none());
    }
}
