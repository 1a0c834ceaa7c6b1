//! Azure OpenAI embedding provider (pipeline A).
//!
//! Calls an Azure OpenAI embeddings deployment directly over `reqwest`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

/// Default dimensionality for `text-embedding-3-large` deployments.
const DEFAULT_DIMENSIONS: usize = 3072;

/// An [`EmbeddingProvider`] backed by an Azure OpenAI embeddings deployment.
///
/// # Configuration
///
/// - `endpoint` – the resource base URL (`https://<resource>.openai.azure.com`)
/// - `deployment` – the embeddings deployment name
/// - `api_version` – the Azure API version query parameter
/// - `api_key` – from the constructor or the `EMBEDDING_A_*` environment
///   variables via [`from_env`](AzureEmbeddingProvider::from_env)
#[derive(Debug)]
pub struct AzureEmbeddingProvider {
    client: reqwest::Client,
    endpoint: String,
    deployment: String,
    api_version: String,
    api_key: String,
    dimensions: usize,
}

impl AzureEmbeddingProvider {
    /// Create a new provider for the given deployment.
    pub fn new(
        endpoint: impl Into<String>,
        deployment: impl Into<String>,
        api_version: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::Embedding {
                provider: "azure-openai".into(),
                message: "API key must not be empty".into(),
            });
        }

        Ok(Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            deployment: deployment.into(),
            api_version: api_version.into(),
            api_key,
            dimensions: DEFAULT_DIMENSIONS,
        })
    }

    /// Create a provider from the `EMBEDDING_A_MODEL`, `EMBEDDING_A_API_BASE`,
    /// `EMBEDDING_A_API_VERSION`, and `EMBEDDING_A_API_KEY` environment
    /// variables.
    pub fn from_env() -> Result<Self> {
        let var = |name: &str| {
            std::env::var(name).map_err(|_| RagError::Config(format!(
                "{name} environment variable not set"
            )))
        };
        Self::new(
            var("EMBEDDING_A_API_BASE")?,
            var("EMBEDDING_A_MODEL")?,
            var("EMBEDDING_A_API_VERSION")?,
            var("EMBEDDING_A_API_KEY")?,
        )
    }

    /// Override the expected output dimensionality.
    pub fn with_dimensions(mut self, dims: usize) -> Self {
        self.dimensions = dims;
        self
    }

    fn url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/embeddings?api-version={}",
            self.endpoint, self.deployment, self.api_version
        )
    }
}

// ── Azure API request/response types ───────────────────────────────

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

// ── EmbeddingProvider implementation ───────────────────────────────

#[async_trait]
impl EmbeddingProvider for AzureEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let results = self.embed_batch(&[text]).await?;
        results.into_iter().next().ok_or_else(|| RagError::Embedding {
            provider: "azure-openai".into(),
            message: "API returned empty response".into(),
        })
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            provider = "azure-openai",
            batch_size = texts.len(),
            deployment = %self.deployment,
            "embedding batch"
        );

        let response = self
            .client
            .post(self.url())
            .header("api-key", &self.api_key)
            .json(&EmbeddingRequest { input: texts.to_vec() })
            .send()
            .await
            .map_err(|e| {
                error!(provider = "azure-openai", error = %e, "request failed");
                RagError::Embedding {
                    provider: "azure-openai".into(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            error!(provider = "azure-openai", %status, "API error");
            return Err(RagError::Embedding {
                provider: "azure-openai".into(),
                message: format!("API returned {status}: {detail}"),
            });
        }

        let embedding_response: EmbeddingResponse = response.json().await.map_err(|e| {
            error!(provider = "azure-openai", error = %e, "failed to parse response");
            RagError::Embedding {
                provider: "azure-openai".into(),
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
        let err = AzureEmbeddingProvider::new("https://r.openai.azure.com", "embed", "2024-02-01", "")
            .unwrap_err();
        assert!(matches!(err, RagError::Embedding { .. }));
    }

    #[test]
    fn url_includes_deployment_and_version() {
        let provider = AzureEmbeddingProvider::new(
            "https://r.openai.azure.com/",
            "text-embedding-3-large",
            "2024-02-01",
            "key",
        )
        .unwrap();
        assert_eq!(
            provider.url(),
            "https://r.openai.azure.com/openai/deployments/text-embedding-3-large/embeddings?api-version=2024-02-01"
        );
    }
}
