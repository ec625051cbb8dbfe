//! Document builder implementation.
//!
//! Turns one `CatalogRecord` into one `SearchDocument`, embedding the
//! description through the configured `EmbeddingProvider`.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument};

use crate::errors::PipelineError;
use catalog_indexer_repository::{EmbeddingError, EmbeddingProvider};
use catalog_indexer_shared::{CatalogRecord, SearchDocument};

/// Builds search documents from catalog records.
///
/// A build is a single-record transform with no shared mutable state, so one
/// builder can serve many concurrent calls. Embedding failures are never
/// retried here; retries belong to the provider.
#[derive(Clone)]
pub struct DocumentBuilder {
    embedder: Arc<dyn EmbeddingProvider>,
    dimensions: usize,
    embed_timeout: Option<Duration>,
}

impl DocumentBuilder {
    /// Create a builder expecting vectors of `dimensions` length.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, dimensions: usize) -> Self {
        Self {
            embedder,
            dimensions,
            embed_timeout: None,
        }
    }

    /// Abort an embedding call that takes longer than `timeout`.
    pub fn with_embed_timeout(mut self, timeout: Duration) -> Self {
        self.embed_timeout = Some(timeout);
        self
    }

    /// Vector length every built document carries.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Build the search document for a record.
    ///
    /// # Arguments
    ///
    /// * `record` - The catalog record to transform
    ///
    /// # Returns
    ///
    /// * `Ok(SearchDocument)` - The assembled document
    /// * `Err(PipelineError::ValidationError)` - If the description or name is empty
    /// * `Err(PipelineError::EmbeddingError)` - If the embedding call fails, times
    ///   out, or returns a vector of the wrong length
    #[instrument(skip(self, record), fields(record_id = %record.id))]
    pub async fn build(&self, record: &CatalogRecord) -> Result<SearchDocument, PipelineError> {
        if record.description.trim().is_empty() {
            return Err(PipelineError::validation(&record.id, "description is empty"));
        }

        if record.name.trim().is_empty() {
            return Err(PipelineError::validation(&record.id, "name is empty"));
        }

        let vector = self
            .embed(&record.description)
            .await
            .map_err(|e| PipelineError::embedding(&record.id, e))?;

        if vector.len() != self.dimensions {
            return Err(PipelineError::embedding(
                &record.id,
                EmbeddingError::dimension_mismatch(self.dimensions, vector.len()),
            ));
        }

        let document = SearchDocument::new(
            record.id.clone(),
            record.name.clone(),
            record.description.clone(),
            vector,
        );

        debug!(slug = %document.filepath, "Built search document");
        Ok(document)
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        match self.embed_timeout {
            Some(limit) => tokio::time::timeout(limit, self.embedder.embed(text))
                .await
                .map_err(|_| {
                    EmbeddingError::timeout(format!("no embedding after {:?}", limit))
                })?,
            None => self.embedder.embed(text).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    /// Stub embedder returning a fixed vector
    struct StubEmbedder {
        vector: Vec<f32>,
        delay: Option<Duration>,
        fail_with: Option<EmbeddingError>,
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl StubEmbedder {
        fn returning(vector: Vec<f32>) -> Self {
            Self {
                vector,
                delay: None,
                fail_with: None,
                seen: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl EmbeddingProvider for StubEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            self.seen.lock().await.push(text.to_string());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match &self.fail_with {
                Some(e) => Err(e.clone()),
                None => Ok(self.vector.clone()),
            }
        }

        fn model_name(&self) -> &str {
            "stub"
        }

        fn dims(&self) -> usize {
            self.vector.len()
        }
    }

    fn builder(embedder: StubEmbedder, dimensions: usize) -> DocumentBuilder {
        DocumentBuilder::new(Arc::new(embedder), dimensions)
    }

    #[tokio::test]
    async fn test_build_document() {
        let embedder = StubEmbedder::returning(vec![0.1, 0.2]);
        let seen = embedder.seen.clone();
        let builder = builder(embedder, 2);

        let doc = builder
            .build(&CatalogRecord::new("1", "Mountain Bike", "Full suspension bike"))
            .await
            .unwrap();

        assert_eq!(doc.id, "1");
        assert_eq!(doc.title, "Mountain Bike");
        assert_eq!(doc.content, "Full suspension bike");
        assert_eq!(doc.filepath, "mountain-bike");
        assert_eq!(doc.url, "/products/mountain-bike");
        assert_eq!(doc.content_vector, vec![0.1, 0.2]);
        assert_eq!(*seen.lock().await, vec!["Full suspension bike".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_description_rejected_before_embedding() {
        let embedder = StubEmbedder::returning(vec![0.1, 0.2]);
        let seen = embedder.seen.clone();
        let builder = builder(embedder, 2);

        let err = builder
            .build(&CatalogRecord::new("9", "Sun Hat", "   "))
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::ValidationError { .. }));
        assert_eq!(err.record_id(), Some("9"));
        assert!(seen.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_name_rejected() {
        let builder = builder(StubEmbedder::returning(vec![0.1, 0.2]), 2);

        let err = builder
            .build(&CatalogRecord::new("3", "", "A product without a name"))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("name is empty"));
    }

    #[tokio::test]
    async fn test_wrong_vector_length_is_embedding_error() {
        let builder = builder(StubEmbedder::returning(vec![0.1, 0.2, 0.3]), 2);

        let err = builder
            .build(&CatalogRecord::new("4", "Trail Mug", "Insulated steel mug"))
            .await
            .unwrap_err();

        match err {
            PipelineError::EmbeddingError { record_id, source } => {
                assert_eq!(record_id, "4");
                assert!(matches!(
                    source,
                    EmbeddingError::DimensionMismatch {
                        expected: 2,
                        actual: 3
                    }
                ));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_provider_failure_is_not_retried() {
        let mut embedder = StubEmbedder::returning(vec![0.1, 0.2]);
        embedder.fail_with = Some(EmbeddingError::connection("connection reset"));
        let seen = embedder.seen.clone();
        let builder = builder(embedder, 2);

        let err = builder
            .build(&CatalogRecord::new("5", "Trail Mug", "Insulated steel mug"))
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::EmbeddingError { .. }));
        assert_eq!(seen.lock().await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_embed_timeout() {
        let mut embedder = StubEmbedder::returning(vec![0.1, 0.2]);
        embedder.delay = Some(Duration::from_secs(10));
        let builder = builder(embedder, 2).with_embed_timeout(Duration::from_secs(1));

        let err = builder
            .build(&CatalogRecord::new("6", "Trail Mug", "Insulated steel mug"))
            .await
            .unwrap_err();

        match err {
            PipelineError::EmbeddingError { source, .. } => {
                assert!(matches!(source, EmbeddingError::Timeout(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_punctuation_passes_through_slug() {
        let builder = builder(StubEmbedder::returning(vec![0.0, 0.0]), 2);

        let doc = builder
            .build(&CatalogRecord::new("7", "Café Rain-Jacket (XL)", "Waterproof"))
            .await
            .unwrap();

        assert_eq!(doc.filepath, "café-rain-jacket-(xl)");
    }
}
