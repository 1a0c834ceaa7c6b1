//! Dual-pipeline document ingestion and retrieval.
//!
//! This crate implements the core of the docket document-chat backend: two
//! independent chunking/embedding/storage pipelines kept behind one
//! ingest-and-search surface.
//!
//! - **Pipeline A**: fixed-size chunking → Azure OpenAI embeddings → Qdrant
//!   (dimension-fixed collection, created eagerly at startup), plus a
//!   generated file description.
//! - **Pipeline B**: semantic chunking → NVIDIA embeddings → pgvector
//!   (schema-flexible table, created on first upsert).
//!
//! Queries fan out to both pipelines concurrently and concatenate results
//! A-then-B, preserving each side's ranking. Every collaborator is injected
//! through traits ([`DocumentLoader`], [`Chunker`], [`EmbeddingProvider`],
//! [`VectorStore`], [`Describer`]), so pipelines are assembled rather than
//! duplicated and every seam takes a test double.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docket_rag::{
//!     FixedSizeChunker, FileDocumentLoader, IngestionPipeline, InMemoryVectorStore,
//!     KnowledgeBase, PipelineId,
//! };
//!
//! let pipeline_a = IngestionPipeline::builder()
//!     .id(PipelineId::A)
//!     .collection("demo_collection")
//!     .batch_size(16)
//!     .loader(Arc::new(FileDocumentLoader::new()))
//!     .chunker(Arc::new(FixedSizeChunker::default()))
//!     .embedder(embedder)
//!     .store(Arc::new(InMemoryVectorStore::new()))
//!     .build()?;
//! pipeline_a.bootstrap().await?;
//! ```

pub mod azure;
pub mod chunking;
pub mod config;
pub mod describe;
pub mod document;
pub mod embedding;
pub mod error;
pub mod inmemory;
pub mod knowledge;
pub mod loader;
pub mod nvidia;
pub mod pgvector;
pub mod pipeline;
pub mod qdrant;
pub mod semantic;
pub mod tool;
pub mod vectorstore;

pub use azure::AzureEmbeddingProvider;
pub use chunking::{Chunker, FixedSizeChunker};
pub use config::{RagConfig, RagConfigBuilder};
pub use describe::{Describer, OpenAiDescriber, truncate_words};
pub use document::{Chunk, IngestionResult, PageSegment, PipelineId, SearchResult};
pub use embedding::{EmbeddingProvider, cosine_similarity};
pub use error::{RagError, Result};
pub use inmemory::InMemoryVectorStore;
pub use knowledge::{BATCH_SIZE_A, COLLECTION_A, COLLECTION_B, KnowledgeBase};
pub use loader::{DocumentLoader, FileDocumentLoader};
pub use nvidia::NvidiaEmbeddingProvider;
pub use pgvector::PgVectorStore;
pub use pipeline::{IngestionPipeline, IngestionPipelineBuilder};
pub use qdrant::QdrantVectorStore;
pub use semantic::SemanticChunker;
pub use tool::{IngestTool, SearchTool};
pub use vectorstore::VectorStore;

// The document type enum lives in docket-core; re-export it for callers
// that only depend on this crate.
pub use docket_core::DocumentType;
