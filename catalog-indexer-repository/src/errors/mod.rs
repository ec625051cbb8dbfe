//! Error types for the catalog indexer repository.

mod embedding_error;
mod search_index_error;

pub use embedding_error::EmbeddingError;
pub use search_index_error::SearchIndexError;
