//! Tool traits for the conversational-agent collaborator.
//!
//! The agent holds a set of [`Tool`]s and decides autonomously when to call
//! them. The ingestion and retrieval entry points of `docket-rag` are
//! exposed through this interface.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// Ambient request context passed to tool invocations.
pub trait ToolContext: Send + Sync {
    /// Identifier of the conversation the tool call belongs to.
    fn conversation_id(&self) -> &str;
}

/// A context for tool calls made outside any conversation (tests, scripts).
#[derive(Debug, Clone, Default)]
pub struct DetachedContext;

impl ToolContext for DetachedContext {
    fn conversation_id(&self) -> &str {
        "1"
    }
}

/// A callable capability an agent may invoke with JSON arguments.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The tool's name as presented to the model.
    fn name(&self) -> &str;

    /// A one-line description of what the tool does.
    fn description(&self) -> &str;

    /// JSON schema for the tool's arguments, if it takes any.
    fn parameters_schema(&self) -> Option<Value> {
        None
    }

    /// Execute the tool with the given arguments.
    async fn execute(&self, ctx: Arc<dyn ToolContext>, args: Value) -> Result<Value>;
}
