//! Ingestion pipeline orchestrator.
//!
//! One generic [`IngestionPipeline`] covers both pipelines: the distinct
//! behavior of A and B lives entirely in the injected
//! `{loader, chunker, embedder, store}` strategies plus the batch policy,
//! not in duplicated control flow. Construct one via
//! [`IngestionPipeline::builder()`].

use std::path::Path;
use std::sync::Arc;

use docket_core::DocumentType;
use tracing::{error, info, warn};

use crate::chunking::Chunker;
use crate::describe::{Describer, truncate_words};
use crate::document::{Chunk, IngestionResult, PageSegment, PipelineId, SearchResult};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::loader::DocumentLoader;
use crate::vectorstore::VectorStore;

/// Number of whitespace-delimited tokens fed to description generation.
const DESCRIPTION_WORD_LIMIT: usize = 1000;

/// Orchestrates load → chunk → embed → store for one pipeline, and
/// retrieval back out of the same collection.
pub struct IngestionPipeline {
    id: PipelineId,
    collection: String,
    batch_size: Option<usize>,
    loader: Arc<dyn DocumentLoader>,
    chunker: Arc<dyn Chunker>,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    describer: Option<Arc<dyn Describer>>,
}

impl IngestionPipeline {
    /// Create a new [`IngestionPipelineBuilder`].
    pub fn builder() -> IngestionPipelineBuilder {
        IngestionPipelineBuilder::default()
    }

    /// The pipeline's identifier.
    pub fn id(&self) -> PipelineId {
        self.id
    }

    /// The collection this pipeline reads and writes.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Eagerly ensure the pipeline's collection exists, sized to the
    /// embedding provider's dimensionality. Pre-existence is not an error.
    pub async fn bootstrap(&self) -> Result<()> {
        let dimensions = self.embedder.dimensions();
        self.store.create_collection(&self.collection, dimensions).await.map_err(|e| {
            error!(collection = %self.collection, error = %e, "failed to create collection");
            e
        })
    }

    /// Ingest a single file: load → chunk → embed → store, then (when a
    /// describer is configured) generate a file description.
    ///
    /// # Errors
    ///
    /// - [`RagError::FileNotFound`] / [`RagError::Load`] from the loader
    /// - [`RagError::Embedding`] from the chunker's or pipeline's provider
    /// - [`RagError::PartialIngestion`] when a batch fails after earlier
    ///   batches were committed; committed batches are not rolled back
    ///
    /// Description-generation failures are non-fatal and degrade the
    /// description to `None`.
    pub async fn ingest(
        &self,
        path: &Path,
        document_type: DocumentType,
    ) -> Result<IngestionResult> {
        let segments = self.loader.load(path, document_type).await?;

        let mut chunks = self.chunker.split(&segments).await?;
        for chunk in &mut chunks {
            chunk.metadata.insert("pipeline".to_string(), self.id.to_string());
        }

        self.upsert_batched(&mut chunks).await?;

        info!(
            pipeline = %self.id,
            path = %path.display(),
            chunk_count = chunks.len(),
            "ingested document"
        );

        let description = self.describe_segments(&segments).await;
        Ok(IngestionResult { pipeline: self.id, description })
    }

    /// Embed and upsert chunks in sequential batches.
    ///
    /// Batches bound provider request sizes; they are submitted one at a
    /// time, so a failure leaves every earlier batch committed.
    async fn upsert_batched(&self, chunks: &mut [Chunk]) -> Result<()> {
        if chunks.is_empty() {
            return Ok(());
        }

        let batch_size = self.batch_size.unwrap_or(chunks.len()).max(1);
        let batch_count = chunks.len().div_ceil(batch_size);

        for (index, batch) in chunks.chunks_mut(batch_size).enumerate() {
            if let Err(e) = self.upsert_one_batch(batch).await {
                error!(
                    pipeline = %self.id,
                    failed_batch = index,
                    batch_count,
                    error = %e,
                    "batch ingestion failed"
                );
                return Err(RagError::PartialIngestion {
                    failed_batch: index,
                    batch_count,
                    batches_committed: index,
                    message: e.to_string(),
                });
            }
        }

        Ok(())
    }

    async fn upsert_one_batch(&self, batch: &mut [Chunk]) -> Result<()> {
        let texts: Vec<&str> = batch.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        for (chunk, embedding) in batch.iter_mut().zip(embeddings) {
            chunk.embedding = embedding;
        }

        self.store.upsert(&self.collection, batch).await
    }

    /// Generate a description from the concatenated segment texts,
    /// truncated to the first [`DESCRIPTION_WORD_LIMIT`] words. Failures
    /// degrade to `None`.
    async fn describe_segments(&self, segments: &[PageSegment]) -> Option<String> {
        let describer = self.describer.as_ref()?;

        let joined = segments.iter().map(|s| s.text.as_str()).collect::<Vec<_>>().join("\n");
        let content = truncate_words(&joined, DESCRIPTION_WORD_LIMIT);

        match describer.describe(&content).await {
            Ok(description) => Some(description),
            Err(e) => {
                warn!(pipeline = %self.id, error = %e, "description generation failed");
                None
            }
        }
    }

    /// Retrieve the `k` chunks most similar to `query` from this pipeline's
    /// collection.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidArgument`] if `k == 0`, and propagates
    /// embedding/store failures.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        if k == 0 {
            return Err(RagError::InvalidArgument("k must be a positive integer".to_string()));
        }

        let embedding = self.embedder.embed(query).await?;
        self.store.search(&self.collection, &embedding, k).await
    }
}

/// Builder for constructing an [`IngestionPipeline`].
///
/// `id`, `collection`, `loader`, `chunker`, `embedder`, and `store` are
/// required; `describer` and `batch_size` are optional.
#[derive(Default)]
pub struct IngestionPipelineBuilder {
    id: Option<PipelineId>,
    collection: Option<String>,
    batch_size: Option<usize>,
    loader: Option<Arc<dyn DocumentLoader>>,
    chunker: Option<Arc<dyn Chunker>>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    store: Option<Arc<dyn VectorStore>>,
    describer: Option<Arc<dyn Describer>>,
}

impl IngestionPipelineBuilder {
    /// Set the pipeline identifier.
    pub fn id(mut self, id: PipelineId) -> Self {
        self.id = Some(id);
        self
    }

    /// Set the collection name the pipeline reads and writes.
    pub fn collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = Some(collection.into());
        self
    }

    /// Bound the number of chunks embedded and upserted per request.
    /// Without a bound the whole file goes up in a single call.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    /// Set the document loader.
    pub fn loader(mut self, loader: Arc<dyn DocumentLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Set the chunking strategy.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Set the embedding provider.
    pub fn embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the vector store backend.
    pub fn store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set an optional describer for post-ingest description generation.
    pub fn describer(mut self, describer: Arc<dyn Describer>) -> Self {
        self.describer = Some(describer);
        self
    }

    /// Build the [`IngestionPipeline`], validating that all required fields
    /// are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if any required field is missing.
    pub fn build(self) -> Result<IngestionPipeline> {
        let id = self.id.ok_or_else(|| RagError::Config("id is required".to_string()))?;
        let collection = self
            .collection
            .ok_or_else(|| RagError::Config("collection is required".to_string()))?;
        let loader =
            self.loader.ok_or_else(|| RagError::Config("loader is required".to_string()))?;
        let chunker =
            self.chunker.ok_or_else(|| RagError::Config("chunker is required".to_string()))?;
        let embedder =
            self.embedder.ok_or_else(|| RagError::Config("embedder is required".to_string()))?;
        let store = self.store.ok_or_else(|| RagError::Config("store is required".to_string()))?;

        Ok(IngestionPipeline {
            id,
            collection,
            batch_size: self.batch_size,
            loader,
            chunker,
            embedder,
            store,
            describer: self.describer,
        })
    }
}
