//! # Catalog Indexer Repository
//!
//! This crate provides the contracts for the external collaborators of the
//! catalog indexer (the embedding model and the vector search index), their
//! error types, and concrete implementations backed by the Azure OpenAI and
//! Azure AI Search REST APIs.

pub mod azure;
pub mod client;
pub mod config;
pub mod errors;
pub mod index_definition;
pub mod interfaces;
pub mod types;

pub use azure::{AzureOpenAiEmbedder, AzureSearchClient};
pub use client::SearchIndexClient;
pub use config::SearchIndexConfig;
pub use errors::{EmbeddingError, SearchIndexError};
pub use index_definition::{HnswParameters, IndexDefinition, VectorMetric};
pub use interfaces::{EmbeddingProvider, SearchIndexProvider};
pub use types::{BatchOperationResult, BatchOperationSummary, IndexProvisioning};
