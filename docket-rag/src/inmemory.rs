//! In-memory vector store using cosine similarity.
//!
//! [`InMemoryVectorStore`] backs tests and small-scale development runs with
//! a `HashMap` behind a `tokio::sync::RwLock`. Unlike the remote backends it
//! validates vector dimensionality itself, so the collection invariant is
//! testable without a server.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{Chunk, SearchResult};
use crate::embedding::cosine_similarity;
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

#[derive(Debug, Default)]
struct Collection {
    dimensions: usize,
    chunks: HashMap<String, Chunk>,
}

/// An in-memory vector store using cosine similarity for search.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryVectorStore {
    /// Create a new empty in-memory vector store.
    pub fn new() -> Self {
        Self::default()
    }

    fn store_err(message: impl Into<String>) -> RagError {
        RagError::Store { backend: "in-memory".to_string(), message: message.into() }
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections
            .entry(name.to_string())
            .or_insert_with(|| Collection { dimensions, chunks: HashMap::new() });
        Ok(())
    }

    async fn upsert(&self, collection: &str, chunks: &[Chunk]) -> Result<()> {
        let mut collections = self.collections.write().await;
        let store = collections
            .get_mut(collection)
            .ok_or_else(|| Self::store_err(format!("collection '{collection}' does not exist")))?;

        for chunk in chunks {
            if chunk.embedding.len() != store.dimensions {
                return Err(Self::store_err(format!(
                    "dimension mismatch in collection '{collection}': expected {}, got {}",
                    store.dimensions,
                    chunk.embedding.len()
                )));
            }
            store.chunks.insert(chunk.id.clone(), chunk.clone());
        }
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchResult>> {
        let collections = self.collections.read().await;
        let store = collections
            .get(collection)
            .ok_or_else(|| Self::store_err(format!("collection '{collection}' does not exist")))?;

        let mut scored: Vec<SearchResult> = store
            .chunks
            .values()
            .map(|chunk| {
                let score = cosine_similarity(&chunk.embedding, embedding);
                SearchResult { chunk: chunk.clone(), score }
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(id: &str, embedding: Vec<f32>) -> Chunk {
        Chunk {
            id: id.to_string(),
            text: format!("text for {id}"),
            embedding,
            metadata: HashMap::new(),
            source: "a.pdf".to_string(),
        }
    }

    #[tokio::test]
    async fn create_collection_is_idempotent() {
        let store = InMemoryVectorStore::new();
        store.create_collection("docs", 3).await.unwrap();
        store.upsert("docs", &[chunk("c1", vec![1.0, 0.0, 0.0])]).await.unwrap();

        // Second creation with identical parameters keeps the data.
        store.create_collection("docs", 3).await.unwrap();
        let results = store.search("docs", &[1.0, 0.0, 0.0], 5).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn upsert_rejects_mismatched_dimensions() {
        let store = InMemoryVectorStore::new();
        store.create_collection("docs", 3).await.unwrap();

        let err =
            store.upsert("docs", &[chunk("c1", vec![1.0, 0.0])]).await.unwrap_err();
        assert!(matches!(err, RagError::Store { .. }));
    }

    #[tokio::test]
    async fn upsert_tolerates_duplicates() {
        let store = InMemoryVectorStore::new();
        store.create_collection("docs", 2).await.unwrap();
        let c = chunk("c1", vec![1.0, 0.0]);
        store.upsert("docs", &[c.clone()]).await.unwrap();
        store.upsert("docs", &[c]).await.unwrap();

        let results = store.search("docs", &[1.0, 0.0], 5).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn search_unknown_collection_fails() {
        let store = InMemoryVectorStore::new();
        let err = store.search("missing", &[1.0], 5).await.unwrap_err();
        assert!(matches!(err, RagError::Store { .. }));
    }
}
