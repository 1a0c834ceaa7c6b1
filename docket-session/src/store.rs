//! JSON-backed chat-history store.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::Result;

/// The conversation used when no identifier is supplied.
pub const DEFAULT_CONVERSATION_ID: &str = "1";

/// Current on-disk format version.
const FORMAT_VERSION: u32 = 1;

/// One entry in a conversation's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who produced the message ("user", "assistant", "tool", ...).
    pub role: String,
    /// The message text.
    pub content: String,
    /// When the message was recorded.
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a message stamped with the current time.
    pub fn now(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self { role: role.into(), content: content.into(), timestamp: Utc::now() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Conversation {
    messages: Vec<ChatMessage>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionFile {
    version: u32,
    conversations: HashMap<String, Conversation>,
}

impl Default for SessionFile {
    fn default() -> Self {
        Self { version: FORMAT_VERSION, conversations: HashMap::new() }
    }
}

/// Chat histories persisted as a single JSON document.
pub struct SessionStore {
    path: PathBuf,
    // Serializes read-modify-write cycles across concurrent appends.
    write_lock: Mutex<()>,
}

impl SessionStore {
    /// Create a store backed by the given file path. The file is created on
    /// first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> SessionFile {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(_) => return SessionFile::default(),
        };

        match serde_json::from_slice::<SessionFile>(&bytes) {
            Ok(file) if file.version == FORMAT_VERSION => file,
            Ok(file) => {
                warn!(
                    path = %self.path.display(),
                    version = file.version,
                    "unknown session format version, resetting"
                );
                SessionFile::default()
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "corrupt session file, resetting");
                SessionFile::default()
            }
        }
    }

    async fn save(&self, file: &SessionFile) -> Result<()> {
        let json = serde_json::to_string_pretty(file)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Append messages to a conversation, creating it if needed.
    pub async fn append(&self, conversation_id: &str, messages: &[ChatMessage]) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut file = self.load().await;
        let conversation = file
            .conversations
            .entry(conversation_id.to_string())
            .or_insert_with(|| Conversation { messages: Vec::new(), updated_at: Utc::now() });
        conversation.messages.extend_from_slice(messages);
        conversation.updated_at = Utc::now();
        self.save(&file).await?;

        debug!(
            conversation_id,
            appended = messages.len(),
            path = %self.path.display(),
            "appended chat messages"
        );
        Ok(())
    }

    /// The full history of a conversation, oldest first. Unknown
    /// conversations are empty, not errors.
    pub async fn history(&self, conversation_id: &str) -> Result<Vec<ChatMessage>> {
        let file = self.load().await;
        Ok(file.conversations.get(conversation_id).map(|c| c.messages.clone()).unwrap_or_default())
    }

    /// Drop all messages of a conversation.
    pub async fn clear(&self, conversation_id: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut file = self.load().await;
        if file.conversations.remove(conversation_id).is_some() {
            self.save(&file).await?;
        }
        Ok(())
    }
}
