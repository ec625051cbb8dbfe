//! Loader module for the catalog indexer pipeline.
//!
//! Provisions the search index and uploads built documents to it.

use std::fmt;
use std::str::FromStr;

use tracing::{error, info, instrument, warn};

use crate::errors::PipelineError;
use catalog_indexer_repository::config::SERVICE_MAX_BATCH_SIZE;
use catalog_indexer_repository::{BatchOperationSummary, IndexProvisioning, SearchIndexClient};
use catalog_indexer_shared::SearchDocument;

/// How the index is provisioned before upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexMode {
    /// Delete the index and create it again from the definition.
    #[default]
    Rebuild,
    /// Create the index only when it is missing.
    Ensure,
}

impl FromStr for IndexMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rebuild" => Ok(Self::Rebuild),
            "ensure" => Ok(Self::Ensure),
            other => Err(format!(
                "unknown index mode '{}', expected 'rebuild' or 'ensure'",
                other
            )),
        }
    }
}

impl fmt::Display for IndexMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rebuild => write!(f, "rebuild"),
            Self::Ensure => write!(f, "ensure"),
        }
    }
}

/// Configuration for the search loader.
#[derive(Debug, Clone, Copy)]
pub struct LoaderConfig {
    /// Number of documents sent per upload request.
    pub batch_size: usize,
    /// How the index is provisioned.
    pub index_mode: IndexMode,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            batch_size: SERVICE_MAX_BATCH_SIZE,
            index_mode: IndexMode::default(),
        }
    }
}

/// Loader that writes documents into the search index.
///
/// The loader is responsible for:
/// - Provisioning the index according to the configured `IndexMode`
/// - Splitting uploads into batches the service accepts
/// - Reporting rejected documents without failing the run
pub struct SearchLoader {
    client: SearchIndexClient,
    config: LoaderConfig,
}

impl SearchLoader {
    /// Create a new search loader with the given client.
    pub fn new(client: SearchIndexClient) -> Self {
        Self::with_config(client, LoaderConfig::default())
    }

    /// Create a new search loader with custom configuration.
    ///
    /// A zero batch size is raised to one, and the batch size is capped at the
    /// client's own limit.
    pub fn with_config(client: SearchIndexClient, mut config: LoaderConfig) -> Self {
        let limit = client.max_batch_size().unwrap_or(usize::MAX);
        config.batch_size = config.batch_size.clamp(1, limit.max(1));

        Self { client, config }
    }

    /// The loader configuration in effect.
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Name of the target index.
    pub fn index_name(&self) -> &str {
        &self.client.definition().name
    }

    /// Provision the index according to the configured mode.
    #[instrument(skip(self), fields(index = %self.index_name(), mode = %self.config.index_mode))]
    pub async fn prepare_index(&self) -> Result<IndexProvisioning, PipelineError> {
        let provisioning = match self.config.index_mode {
            IndexMode::Rebuild => self.client.rebuild_index().await?,
            IndexMode::Ensure => self.client.ensure_index().await?,
        };

        info!(?provisioning, "Search index ready");
        Ok(provisioning)
    }

    /// Upload documents in batches.
    ///
    /// Per-document rejections are logged and returned in the summary; only a
    /// failure of a whole batch request is an error.
    #[instrument(skip(self, documents), fields(index = %self.index_name(), count = documents.len()))]
    pub async fn load(
        &self,
        documents: &[SearchDocument],
    ) -> Result<BatchOperationSummary, PipelineError> {
        let mut summary = BatchOperationSummary::empty();

        for (batch_number, batch) in documents.chunks(self.config.batch_size).enumerate() {
            info!(
                batch = batch_number,
                size = batch.len(),
                "Uploading documents to search index"
            );

            let batch_summary = self.client.upload(batch).await.map_err(|e| {
                error!(batch = batch_number, error = %e, "Upload batch failed");
                PipelineError::from(e)
            })?;

            for rejected in batch_summary.failures() {
                let reason = rejected
                    .error
                    .as_ref()
                    .map(|e| e.to_string())
                    .unwrap_or_default();
                warn!(
                    key = %rejected.key,
                    status = ?rejected.status_code,
                    error = %reason,
                    "Document rejected by search index"
                );
            }

            summary.merge(batch_summary);
        }

        info!(
            uploaded = summary.succeeded,
            rejected = summary.failed,
            "Upload finished"
        );
        Ok(summary)
    }
}
