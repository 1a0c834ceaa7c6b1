//! Chat-history persistence.
//!
//! Conversations are stored in one JSON document on local disk, keyed by a
//! conversation identifier. The envelope is versioned and generic (a
//! message list with role/content/timestamp per entry) rather than any
//! provider's native serialization. Corrupt or missing state silently
//! resets to empty.

mod error;
mod store;

pub use error::{Result, SessionError};
pub use store::{ChatMessage, DEFAULT_CONVERSATION_ID, SessionStore};
