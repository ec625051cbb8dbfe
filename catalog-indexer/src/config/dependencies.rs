//! Dependency initialization and wiring for the catalog indexer.

use std::sync::Arc;
use tracing::info;

use super::IndexerConfig;
use crate::IndexingError;
use catalog_indexer_pipeline::{
    CatalogLoader, DocumentBuilder, LoaderConfig, Orchestrator, OrchestratorConfig, SearchLoader,
};
use catalog_indexer_repository::{
    AzureOpenAiEmbedder, AzureSearchClient, IndexDefinition, SearchIndexClient, SearchIndexConfig,
};
use catalog_indexer_repository::azure::AzureOpenAiSettings;

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured orchestrator ready to run.
    pub orchestrator: Orchestrator,
}

impl Dependencies {
    /// Initialize all dependencies from a validated configuration.
    ///
    /// No network call is made here; the services are first contacted when
    /// the orchestrator runs.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexingError)` - If the configuration is invalid or a client cannot be built
    pub fn new(config: &IndexerConfig) -> Result<Self, IndexingError> {
        config.validate()?;

        info!(
            embedding_endpoint = %config.embedding_endpoint,
            search_endpoint = %config.search_endpoint,
            model = %config.model_identifier,
            index = %config.index_name,
            "Initializing dependencies"
        );

        // Initialize embedding client
        let embedder = AzureOpenAiEmbedder::new(AzureOpenAiSettings {
            endpoint: config.embedding_endpoint.clone(),
            api_key: config.embedding_key.clone(),
            deployment: config.model_identifier.clone(),
            api_version: config.embedding_api_version.clone(),
            dimensions: config.embedding_dimensions,
            timeout: config.request_timeout,
            max_retries: config.max_retries,
        })
        .map_err(|e| IndexingError::config(format!("Failed to create embedding client: {}", e)))?;

        // Initialize search index client
        let search_client = AzureSearchClient::new(
            &config.search_endpoint,
            config.search_key.clone(),
            config.search_api_version.clone(),
            config.request_timeout,
        )
        .map_err(|e| IndexingError::config(format!("Failed to create search client: {}", e)))?;

        let definition = IndexDefinition::new(&config.index_name, config.embedding_dimensions);
        let index_client = SearchIndexClient::with_config(
            Box::new(search_client),
            definition,
            SearchIndexConfig::with_max_batch_size(config.upload_batch_size),
        );

        // Initialize processor
        let mut builder = DocumentBuilder::new(Arc::new(embedder), config.embedding_dimensions);
        if let Some(timeout) = config.embed_timeout {
            builder = builder.with_embed_timeout(timeout);
        }

        // Initialize loader with search client
        let loader = SearchLoader::with_config(
            index_client,
            LoaderConfig {
                batch_size: config.upload_batch_size,
                index_mode: config.index_mode,
            },
        );

        // Create orchestrator
        let orchestrator = Orchestrator::with_config(
            CatalogLoader::new(),
            builder,
            loader,
            OrchestratorConfig {
                concurrency: config.concurrency,
                failure_policy: config.failure_policy,
            },
        );

        info!(
            concurrency = config.concurrency,
            policy = %config.failure_policy,
            mode = %config.index_mode,
            "Dependencies ready"
        );

        Ok(Self { orchestrator })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_indexer_pipeline::FailurePolicy;

    fn config() -> IndexerConfig {
        IndexerConfig::new(
            "https://contoso.openai.azure.com",
            "embedding-secret",
            "https://contoso.search.windows.net",
            "search-secret",
            "text-embedding-ada-002",
        )
    }

    #[test]
    fn test_wires_orchestrator_from_config() {
        let mut config = config();
        config.concurrency = 8;
        config.failure_policy = FailurePolicy::CollectErrors;

        let deps = Dependencies::new(&config).unwrap();

        assert_eq!(deps.orchestrator.config().concurrency, 8);
        assert_eq!(
            deps.orchestrator.config().failure_policy,
            FailurePolicy::CollectErrors
        );
    }

    #[test]
    fn test_rejects_missing_key() {
        let mut config = config();
        config.embedding_key = String::new();

        assert!(matches!(
            Dependencies::new(&config),
            Err(IndexingError::MissingConfig("embeddingKey"))
        ));
    }
}
