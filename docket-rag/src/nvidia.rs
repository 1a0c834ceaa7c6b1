//! NVIDIA NIM embedding provider (pipeline B).
//!
//! Calls an OpenAI-compatible NIM `/embeddings` endpoint over `reqwest`.
//! NIM retrieval models distinguish passage and query inputs via the
//! `input_type` request field.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

/// The hosted NIM API base.
const DEFAULT_BASE_URL: &str = "https://integrate.api.nvidia.com/v1";

/// The default retrieval embedding model.
const DEFAULT_MODEL: &str = "nvidia/nv-embedqa-e5-v5";

/// Default dimensionality for `nv-embedqa-e5-v5`.
const DEFAULT_DIMENSIONS: usize = 1024;

/// An [`EmbeddingProvider`] backed by the NVIDIA NIM embeddings API.
pub struct NvidiaEmbeddingProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
    input_type: &'static str,
    dimensions: usize,
}

impl NvidiaEmbeddingProvider {
    /// Create a new provider with the given API key, using the hosted NIM
    /// endpoint and default retrieval model.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::Embedding {
                provider: "nvidia".into(),
                message: "API key must not be empty".into(),
            });
        }

        Ok(Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key,
            input_type: "passage",
            dimensions: DEFAULT_DIMENSIONS,
        })
    }

    /// Create a provider from the `EMBEDDING_B_MODEL`, `EMBEDDING_B_API_BASE`,
    /// and `EMBEDDING_B_API_KEY` environment variables.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("EMBEDDING_B_API_KEY").map_err(|_| RagError::Config(
            "EMBEDDING_B_API_KEY environment variable not set".to_string(),
        ))?;
        let mut provider = Self::new(api_key)?;
        if let Ok(model) = std::env::var("EMBEDDING_B_MODEL") {
            provider = provider.with_model(model);
        }
        if let Ok(base) = std::env::var("EMBEDDING_B_API_BASE") {
            provider = provider.with_base_url(base);
        }
        Ok(provider)
    }

    /// Set the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the API base URL (self-hosted NIM).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Embed inputs as queries rather than passages.
    pub fn for_queries(mut self) -> Self {
        self.input_type = "query";
        self
    }

    /// Override the expected output dimensionality.
    pub fn with_dimensions(mut self, dims: usize) -> Self {
        self.dimensions = dims;
        self
    }
}

// ── NIM API request/response types ─────────────────────────────────

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
    input_type: &'a str,
    encoding_format: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

// ── EmbeddingProvider implementation ───────────────────────────────

#[async_trait]
impl EmbeddingProvider for NvidiaEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let results = self.embed_batch(&[text]).await?;
        results.into_iter().next().ok_or_else(|| RagError::Embedding {
            provider: "nvidia".into(),
            message: "API returned empty response".into(),
        })
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            provider = "nvidia",
            batch_size = texts.len(),
            model = %self.model,
            "embedding batch"
        );

        let request_body = EmbeddingRequest {
            model: &self.model,
            input: texts.to_vec(),
            input_type: self.input_type,
            encoding_format: "float",
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "nvidia", error = %e, "request failed");
                RagError::Embedding {
                    provider: "nvidia".into(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            error!(provider = "nvidia", %status, "API error");
            return Err(RagError::Embedding {
                provider: "nvidia".into(),
                message: format!("API returned {status}: {body}"),
            });
        }

        let embedding_response: EmbeddingResponse = response.json().await.map_err(|e| {
            error!(provider = "nvidia", error = %e, "failed to parse response");
            RagError::Embedding {
                provider: "nvidia".into(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        Ok(embedding_response.data.into_iter().map(|d| d.embedding).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_api_key_is_rejected() {
        assert!(NvidiaEmbeddingProvider::new("").is_err());
    }

    #[test]
    fn builder_overrides_apply() {
        let provider = NvidiaEmbeddingProvider::new("key")
            .unwrap()
            .with_model("nvidia/llama-3.2-nv-embedqa-1b-v2")
            .with_base_url("http://localhost:8000/v1/")
            .with_dimensions(2048)
            .for_queries();
        assert_eq!(provider.base_url, "http://localhost:8000/v1");
        assert_eq!(provider.input_type, "query");
        assert_eq!(provider.dimensions(), 2048);
    }
}
