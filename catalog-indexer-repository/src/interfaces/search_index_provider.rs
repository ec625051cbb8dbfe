//! Search index provider trait definition.
//!
//! This module defines the abstract interface for search index operations,
//! allowing for different backend implementations.

use async_trait::async_trait;

use crate::errors::SearchIndexError;
use crate::index_definition::IndexDefinition;
use crate::types::BatchOperationSummary;
use catalog_indexer_shared::SearchDocument;

/// Abstracts the underlying search index implementation.
///
/// Implementations are injected into `SearchIndexClient` to enable dependency
/// injection and easy testing with mock implementations.
///
/// All methods return `Result<T, SearchIndexError>` for consistent error handling across
/// different backend implementations.
#[async_trait]
pub trait SearchIndexProvider: Send + Sync {
    /// Check whether an index with the given name exists.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The index exists
    /// * `Ok(false)` - The index does not exist
    /// * `Err(SearchIndexError)` - If the service could not be queried
    async fn index_exists(&self, name: &str) -> Result<bool, SearchIndexError>;

    /// Delete the index with the given name.
    ///
    /// Deleting an index that does not exist is considered successful.
    async fn delete_index(&self, name: &str) -> Result<(), SearchIndexError>;

    /// Create the index described by `definition`, or update it in place if it
    /// already exists.
    async fn create_or_update_index(
        &self,
        definition: &IndexDefinition,
    ) -> Result<(), SearchIndexError>;

    /// Upload documents to the named index and report the outcome of each one.
    ///
    /// Individual rejections are reported in the returned summary, in the same
    /// order as `documents`. An `Err` means the request failed as a whole.
    ///
    /// # Arguments
    ///
    /// * `index_name` - The target index
    /// * `documents` - Documents to upload (upload replaces existing documents with the same key)
    ///
    /// # Returns
    ///
    /// * `Ok(BatchOperationSummary)` - Contains aggregate statistics and individual results
    /// * `Err(SearchIndexError)` - If the bulk operation fails entirely
    async fn upload_documents(
        &self,
        index_name: &str,
        documents: &[SearchDocument],
    ) -> Result<BatchOperationSummary, SearchIndexError>;
}
