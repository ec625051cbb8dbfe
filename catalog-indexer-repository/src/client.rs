//! Search index client implementation.
//!
//! This module provides the main client for interacting with the search index.
//! Application code uses it to provision the product index and upload documents.

use tracing::{debug, info, instrument, warn};

use crate::config::SearchIndexConfig;
use crate::errors::SearchIndexError;
use crate::index_definition::IndexDefinition;
use crate::interfaces::SearchIndexProvider;
use crate::types::{BatchOperationResult, BatchOperationSummary, IndexProvisioning};
use catalog_indexer_shared::SearchDocument;

/// The main client for interacting with the search index.
///
/// Binds a provider to one index definition, so every operation targets the
/// same index and every uploaded document is checked against its schema.
pub struct SearchIndexClient {
    provider: Box<dyn SearchIndexProvider>,
    definition: IndexDefinition,
    config: SearchIndexConfig,
}

impl SearchIndexClient {
    /// Create a new SearchIndexClient with default configuration.
    pub fn new(provider: Box<dyn SearchIndexProvider>, definition: IndexDefinition) -> Self {
        Self {
            provider,
            definition,
            config: SearchIndexConfig::default(),
        }
    }

    /// Create a new SearchIndexClient with custom configuration.
    pub fn with_config(
        provider: Box<dyn SearchIndexProvider>,
        definition: IndexDefinition,
        config: SearchIndexConfig,
    ) -> Self {
        Self {
            provider,
            definition,
            config,
        }
    }

    /// The definition of the index this client writes to.
    pub fn definition(&self) -> &IndexDefinition {
        &self.definition
    }

    /// Largest number of documents accepted by [`upload`](Self::upload).
    pub fn max_batch_size(&self) -> Option<usize> {
        self.config.max_batch_size
    }

    /// Check if batch size exceeds the configured limit.
    fn validate_batch_size(&self, size: usize) -> Result<(), SearchIndexError> {
        if let Some(max) = self.config.max_batch_size {
            if size > max {
                return Err(SearchIndexError::batch_size_exceeded(size, max));
            }
        }
        Ok(())
    }

    /// Make sure the index exists and return how it was obtained.
    ///
    /// Creates the index from the definition when it is missing and leaves an
    /// existing index untouched. Calling this repeatedly is safe.
    #[instrument(skip(self), fields(index = %self.definition.name))]
    pub async fn ensure_index(&self) -> Result<IndexProvisioning, SearchIndexError> {
        if self.provider.index_exists(&self.definition.name).await? {
            info!("Search index exists");
            return Ok(IndexProvisioning::Existing);
        }

        self.provider.create_or_update_index(&self.definition).await?;
        info!("Search index created");
        Ok(IndexProvisioning::Created)
    }

    /// Drop the index (if present) and create it again from the definition.
    #[instrument(skip(self), fields(index = %self.definition.name))]
    pub async fn rebuild_index(&self) -> Result<IndexProvisioning, SearchIndexError> {
        info!("Deleting search index");
        self.provider.delete_index(&self.definition.name).await?;

        info!("Creating search index");
        self.provider.create_or_update_index(&self.definition).await?;

        Ok(IndexProvisioning::Recreated)
    }

    /// Upload one batch of documents.
    ///
    /// Documents that do not fit the schema are refused locally and reported
    /// as failures; the rest are sent to the provider. The returned results
    /// follow the order of `documents`.
    ///
    /// The batch size is limited by the configured max_batch_size (default: 1000).
    #[instrument(skip(self, documents), fields(index = %self.definition.name, count = documents.len()))]
    pub async fn upload(
        &self,
        documents: &[SearchDocument],
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        if documents.is_empty() {
            return Ok(BatchOperationSummary::empty());
        }

        self.validate_batch_size(documents.len())?;

        let mut slots: Vec<Option<BatchOperationResult>> = Vec::with_capacity(documents.len());
        let mut accepted = Vec::with_capacity(documents.len());
        let mut positions = Vec::with_capacity(documents.len());

        for (position, document) in documents.iter().enumerate() {
            match self.definition.validate_document(document) {
                Ok(()) => {
                    slots.push(None);
                    accepted.push(document.clone());
                    positions.push(position);
                }
                Err(e) => {
                    warn!(key = %document.id, error = %e, "Refusing document before upload");
                    slots.push(Some(BatchOperationResult::failed(document.id.clone(), None, e)));
                }
            }
        }

        if !accepted.is_empty() {
            let summary = self
                .provider
                .upload_documents(&self.definition.name, &accepted)
                .await?;

            if summary.results.len() != accepted.len() {
                return Err(SearchIndexError::parse(format!(
                    "search service returned {} results for {} documents",
                    summary.results.len(),
                    accepted.len()
                )));
            }

            for (position, result) in positions.into_iter().zip(summary.results) {
                slots[position] = Some(result);
            }
        }

        let results: Vec<BatchOperationResult> = slots.into_iter().flatten().collect();
        let summary = BatchOperationSummary::from_results(results);

        debug!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Upload batch finished"
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    /// Mock provider for testing
    #[derive(Default)]
    struct MockProvider {
        exists: bool,
        calls: Arc<Mutex<Vec<String>>>,
        uploaded: Arc<Mutex<Vec<SearchDocument>>>,
        reject_keys: Vec<String>,
        should_fail: bool,
    }

    #[async_trait]
    impl SearchIndexProvider for MockProvider {
        async fn index_exists(&self, name: &str) -> Result<bool, SearchIndexError> {
            self.calls.lock().await.push(format!("exists:{}", name));
            Ok(self.exists)
        }

        async fn delete_index(&self, name: &str) -> Result<(), SearchIndexError> {
            self.calls.lock().await.push(format!("delete:{}", name));
            Ok(())
        }

        async fn create_or_update_index(
            &self,
            definition: &IndexDefinition,
        ) -> Result<(), SearchIndexError> {
            self.calls
                .lock()
                .await
                .push(format!("create:{}", definition.name));
            Ok(())
        }

        async fn upload_documents(
            &self,
            _index_name: &str,
            documents: &[SearchDocument],
        ) -> Result<BatchOperationSummary, SearchIndexError> {
            if self.should_fail {
                return Err(SearchIndexError::bulk_operation("Mock failure"));
            }

            self.uploaded.lock().await.extend_from_slice(documents);

            let results = documents
                .iter()
                .map(|doc| {
                    if self.reject_keys.contains(&doc.id) {
                        BatchOperationResult::failed(
                            doc.id.clone(),
                            Some(400),
                            SearchIndexError::index("rejected by mock"),
                        )
                    } else {
                        BatchOperationResult::succeeded(doc.id.clone(), Some(201))
                    }
                })
                .collect();

            Ok(BatchOperationSummary::from_results(results))
        }
    }

    fn doc(id: &str, dims: usize) -> SearchDocument {
        SearchDocument::new(id, format!("Product {}", id), "description", vec![0.5; dims])
    }

    #[tokio::test]
    async fn test_ensure_index_creates_missing_index() {
        let provider = MockProvider::default();
        let calls = provider.calls.clone();
        let client = SearchIndexClient::new(Box::new(provider), IndexDefinition::new("products", 2));

        let outcome = client.ensure_index().await.unwrap();

        assert_eq!(outcome, IndexProvisioning::Created);
        assert_eq!(
            *calls.lock().await,
            vec!["exists:products".to_string(), "create:products".to_string()]
        );
    }

    #[tokio::test]
    async fn test_ensure_index_keeps_existing_index() {
        let provider = MockProvider {
            exists: true,
            ..Default::default()
        };
        let calls = provider.calls.clone();
        let client = SearchIndexClient::new(Box::new(provider), IndexDefinition::new("products", 2));

        let outcome = client.ensure_index().await.unwrap();

        assert_eq!(outcome, IndexProvisioning::Existing);
        assert_eq!(*calls.lock().await, vec!["exists:products".to_string()]);
    }

    #[tokio::test]
    async fn test_rebuild_index_deletes_then_creates() {
        let provider = MockProvider {
            exists: true,
            ..Default::default()
        };
        let calls = provider.calls.clone();
        let client = SearchIndexClient::new(Box::new(provider), IndexDefinition::new("products", 2));

        let outcome = client.rebuild_index().await.unwrap();

        assert_eq!(outcome, IndexProvisioning::Recreated);
        assert_eq!(
            *calls.lock().await,
            vec!["delete:products".to_string(), "create:products".to_string()]
        );
    }

    #[tokio::test]
    async fn test_upload_reports_rejections_in_order() {
        let provider = MockProvider {
            reject_keys: vec!["2".to_string()],
            ..Default::default()
        };
        let client = SearchIndexClient::new(Box::new(provider), IndexDefinition::new("products", 2));

        let summary = client
            .upload(&[doc("1", 2), doc("2", 2), doc("3", 2)])
            .await
            .unwrap();

        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        let keys: Vec<&str> = summary.results.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["1", "2", "3"]);
        assert!(!summary.results[1].success);
    }

    #[tokio::test]
    async fn test_upload_refuses_wrong_dimension_locally() {
        let provider = MockProvider::default();
        let uploaded = provider.uploaded.clone();
        let client = SearchIndexClient::new(Box::new(provider), IndexDefinition::new("products", 2));

        let summary = client
            .upload(&[doc("1", 2), doc("2", 3), doc("3", 2)])
            .await
            .unwrap();

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.results[1].key, "2");
        assert!(matches!(
            summary.results[1].error,
            Some(SearchIndexError::ValidationError(_))
        ));

        let sent: Vec<String> = uploaded.lock().await.iter().map(|d| d.id.clone()).collect();
        assert_eq!(sent, vec!["1".to_string(), "3".to_string()]);
    }

    #[tokio::test]
    async fn test_upload_batch_size_limit() {
        let client = SearchIndexClient::with_config(
            Box::new(MockProvider::default()),
            IndexDefinition::new("products", 2),
            SearchIndexConfig::with_max_batch_size(2),
        );

        let result = client.upload(&[doc("1", 2), doc("2", 2), doc("3", 2)]).await;

        assert!(matches!(
            result,
            Err(SearchIndexError::BatchSizeExceeded { provided: 3, max: 2 })
        ));
    }

    #[tokio::test]
    async fn test_upload_whole_batch_failure() {
        let provider = MockProvider {
            should_fail: true,
            ..Default::default()
        };
        let client = SearchIndexClient::new(Box::new(provider), IndexDefinition::new("products", 2));

        let result = client.upload(&[doc("1", 2)]).await;
        assert!(matches!(result, Err(SearchIndexError::BulkOperationError(_))));
    }

    #[tokio::test]
    async fn test_upload_empty() {
        let client = SearchIndexClient::new(
            Box::new(MockProvider::default()),
            IndexDefinition::new("products", 2),
        );

        let summary = client.upload(&[]).await.unwrap();
        assert_eq!(summary.total, 0);
    }
}
