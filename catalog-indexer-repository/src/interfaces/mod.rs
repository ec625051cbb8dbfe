//! Interface definitions for the external collaborators.
//!
//! The pipeline only ever talks to these traits, so the Azure implementations
//! can be swapped for stubs in tests or for other backends.

mod embedding_provider;
mod search_index_provider;

pub use embedding_provider::EmbeddingProvider;
pub use search_index_provider::SearchIndexProvider;
