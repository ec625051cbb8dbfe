//! Orchestrator module for the catalog indexer pipeline.
//!
//! Coordinates the catalog, processor, and loader components.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use futures::stream::{self, StreamExt};
use tracing::{error, info, instrument, warn};

use crate::catalog::CatalogLoader;
use crate::errors::PipelineError;
use crate::loader::SearchLoader;
use crate::processor::DocumentBuilder;
use catalog_indexer_repository::{BatchOperationSummary, IndexProvisioning};
use catalog_indexer_shared::{CatalogRecord, SearchDocument};

/// Number of records converted at the same time by default.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// What happens when a single record cannot be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop at the first failed record and return its error.
    #[default]
    FailFast,
    /// Keep going, returning the built documents next to the failures.
    CollectErrors,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail-fast" | "failfast" => Ok(Self::FailFast),
            "collect-errors" | "collect" => Ok(Self::CollectErrors),
            other => Err(format!(
                "unknown failure policy '{}', expected 'fail-fast' or 'collect-errors'",
                other
            )),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FailFast => write!(f, "fail-fast"),
            Self::CollectErrors => write!(f, "collect-errors"),
        }
    }
}

/// Configuration for the orchestrator.
#[derive(Debug, Clone, Copy)]
pub struct OrchestratorConfig {
    /// Maximum number of records being built at once. Values below one are
    /// treated as one.
    pub concurrency: usize,
    /// Policy for per-record failures.
    pub failure_policy: FailurePolicy,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            failure_policy: FailurePolicy::default(),
        }
    }
}

/// A record that could not be turned into a document.
#[derive(Debug)]
pub struct RecordFailure {
    /// Zero-based position of the record in the catalog.
    pub position: usize,
    /// Id of the record.
    pub record_id: String,
    /// Why the build failed.
    pub error: PipelineError,
}

/// Result of building documents for a whole catalog.
#[derive(Debug, Default)]
pub struct BuildOutcome {
    /// Built documents, in catalog order.
    pub documents: Vec<SearchDocument>,
    /// Failed records, in catalog order. Always empty under `FailFast`.
    pub failures: Vec<RecordFailure>,
}

impl BuildOutcome {
    /// Number of records the outcome accounts for.
    pub fn records(&self) -> usize {
        self.documents.len() + self.failures.len()
    }

    /// Whether every record produced a document.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Summary of a full indexing run.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Rows read from the catalog.
    pub records_read: usize,
    /// Documents built from those rows.
    pub documents_built: usize,
    /// Records that failed to build.
    pub failures: Vec<RecordFailure>,
    /// How the index was provisioned; `None` when the index stage was skipped.
    pub provisioning: Option<IndexProvisioning>,
    /// Per-document upload results; `None` when the index stage was skipped.
    pub upload: Option<BatchOperationSummary>,
}

impl RunReport {
    /// Report for a run that stopped after building documents.
    pub fn from_outcome(outcome: BuildOutcome) -> Self {
        Self {
            records_read: outcome.records(),
            documents_built: outcome.documents.len(),
            failures: outcome.failures,
            provisioning: None,
            upload: None,
        }
    }

    /// Documents accepted by the index.
    pub fn uploaded(&self) -> usize {
        self.upload.as_ref().map_or(0, |u| u.succeeded)
    }

    /// Documents rejected by the index.
    pub fn rejected(&self) -> usize {
        self.upload.as_ref().map_or(0, |u| u.failed)
    }

    /// Whether every record was built and every upload accepted.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.rejected() == 0
    }
}

/// Orchestrator that coordinates the pipeline components.
///
/// The orchestrator:
/// - Loads the catalog
/// - Drives records through the document builder with bounded concurrency
/// - Restores catalog order before handing documents to the loader
/// - Applies the failure policy to per-record errors
pub struct Orchestrator {
    catalog: CatalogLoader,
    builder: DocumentBuilder,
    loader: SearchLoader,
    config: OrchestratorConfig,
}

impl Orchestrator {
    /// Create a new orchestrator with the given components.
    pub fn new(catalog: CatalogLoader, builder: DocumentBuilder, loader: SearchLoader) -> Self {
        Self::with_config(catalog, builder, loader, OrchestratorConfig::default())
    }

    /// Create a new orchestrator with custom configuration.
    pub fn with_config(
        catalog: CatalogLoader,
        builder: DocumentBuilder,
        loader: SearchLoader,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            catalog,
            builder,
            loader,
            config,
        }
    }

    /// The orchestrator configuration in effect.
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Build one document per record.
    ///
    /// Records are converted concurrently, at most `concurrency` at a time.
    /// Under `FailFast` the first failure to complete is returned and the
    /// calls still in flight are dropped. Under `CollectErrors` every record is
    /// attempted.
    #[instrument(skip(self, records), fields(records = records.len(), policy = %self.config.failure_policy))]
    pub async fn build_documents(
        &self,
        records: &[CatalogRecord],
    ) -> Result<BuildOutcome, PipelineError> {
        let builder = &self.builder;
        let mut pending = stream::iter(records.iter().enumerate())
            .map(|(position, record)| async move { (position, builder.build(record).await) })
            .buffer_unordered(self.config.concurrency.max(1));

        let mut built: Vec<(usize, SearchDocument)> = Vec::with_capacity(records.len());
        let mut failures = Vec::new();

        while let Some((position, result)) = pending.next().await {
            let record_id = &records[position].id;
            match result {
                Ok(document) => built.push((position, document)),
                Err(e) => match self.config.failure_policy {
                    FailurePolicy::FailFast => {
                        error!(
                            record_id = %record_id,
                            position,
                            error = %e,
                            "Record failed, aborting"
                        );
                        return Err(e);
                    }
                    FailurePolicy::CollectErrors => {
                        warn!(record_id = %record_id, position, error = %e, "Record failed");
                        failures.push(RecordFailure {
                            position,
                            record_id: record_id.clone(),
                            error: e,
                        });
                    }
                },
            }
        }

        built.sort_by_key(|(position, _)| *position);
        failures.sort_by_key(|f| f.position);

        info!(
            built = built.len(),
            failed = failures.len(),
            "Document build finished"
        );

        Ok(BuildOutcome {
            documents: built.into_iter().map(|(_, document)| document).collect(),
            failures,
        })
    }

    /// Load the catalog at `path` and build its documents without touching
    /// the index.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn prepare(&self, path: &Path) -> Result<BuildOutcome, PipelineError> {
        let records = self.catalog.load_path(path)?;
        self.build_documents(&records).await
    }

    /// Provision the index and upload already built documents.
    #[instrument(skip(self, outcome), fields(documents = outcome.documents.len()))]
    pub async fn publish(&self, outcome: BuildOutcome) -> Result<RunReport, PipelineError> {
        let provisioning = self.loader.prepare_index().await?;
        let upload = self.loader.load(&outcome.documents).await?;

        let mut report = RunReport::from_outcome(outcome);
        report.provisioning = Some(provisioning);
        report.upload = Some(upload);
        Ok(report)
    }

    /// Run the whole pipeline for the catalog at `path`.
    ///
    /// Documents are built before the index is touched, so a catalog that
    /// cannot be read or a fail-fast record error leaves the index as it was.
    /// When every record failed to build, the index stage is skipped and the
    /// report carries no provisioning or upload results.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn run(&self, path: &Path) -> Result<RunReport, PipelineError> {
        info!("Starting catalog indexer run");

        let outcome = self.prepare(path).await?;

        if outcome.documents.is_empty() && !outcome.failures.is_empty() {
            warn!(
                failed = outcome.failures.len(),
                "No document was built, leaving the search index untouched"
            );
            return Ok(RunReport::from_outcome(outcome));
        }

        let report = self.publish(outcome).await?;

        info!(
            records = report.records_read,
            built = report.documents_built,
            failed = report.failures.len(),
            uploaded = report.uploaded(),
            rejected = report.rejected(),
            "Catalog indexer run complete"
        );
        Ok(report)
    }
}
