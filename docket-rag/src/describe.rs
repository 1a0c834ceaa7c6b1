//! File description generation (pipeline A's enrichment step).
//!
//! A [`Describer`] summarizes a freshly ingested file. Failures here are
//! non-fatal: the pipeline degrades the description to `None` and the
//! ingestion still succeeds.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error};

use crate::error::{RagError, Result};

/// The default OpenAI chat completions endpoint.
const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Generates a short textual description of file content.
#[async_trait]
pub trait Describer: Send + Sync {
    /// Describe the given content.
    async fn describe(&self, content: &str) -> Result<String>;
}

/// Keep the first `max_words` whitespace-delimited tokens of `content`.
pub fn truncate_words(content: &str, max_words: usize) -> String {
    content.split_whitespace().take(max_words).collect::<Vec<_>>().join(" ")
}

/// A [`Describer`] backed by an OpenAI-compatible chat completions API.
pub struct OpenAiDescriber {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiDescriber {
    /// Create a new describer for the given model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::Config("describer API key must not be empty".into()));
        }
        Ok(Self { client: reqwest::Client::new(), api_key, model: model.into() })
    }

    /// Create a describer from the `OPENAI_API_KEY` and `LLM_MODEL`
    /// environment variables.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| RagError::Config(
            "OPENAI_API_KEY environment variable not set".to_string(),
        ))?;
        let model = std::env::var("LLM_MODEL").map_err(|_| RagError::Config(
            "LLM_MODEL environment variable not set".to_string(),
        ))?;
        Self::new(api_key, model)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<serde_json::Value>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[async_trait]
impl Describer for OpenAiDescriber {
    async fn describe(&self, content: &str) -> Result<String> {
        debug!(model = %self.model, content_len = content.len(), "generating file description");

        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![
                json!({
                    "role": "system",
                    "content": "Generate a concise description of the provided file content.",
                }),
                json!({
                    "role": "user",
                    "content": format!("File content:\n{content}"),
                }),
            ],
            temperature: 0.3,
            max_tokens: 512,
        };

        let response = self
            .client
            .post(OPENAI_CHAT_URL)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "description request failed");
                RagError::Pipeline(format!("description request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(RagError::Pipeline(format!("description API returned {status}")));
        }

        let chat: ChatResponse = response.json().await.map_err(|e| {
            RagError::Pipeline(format!("failed to parse description response: {e}"))
        })?;

        chat.choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .ok_or_else(|| RagError::Pipeline("description API returned no choices".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_first_words() {
        assert_eq!(truncate_words("one two three four", 2), "one two");
    }

    #[test]
    fn truncate_collapses_whitespace() {
        assert_eq!(truncate_words("one\n  two\tthree", 10), "one two three");
    }

    #[test]
    fn truncate_handles_short_input() {
        assert_eq!(truncate_words("only", 1000), "only");
        assert_eq!(truncate_words("", 1000), "");
    }

    #[test]
    fn empty_api_key_is_rejected() {
        assert!(OpenAiDescriber::new("", "gpt-4o-mini").is_err());
    }
}
