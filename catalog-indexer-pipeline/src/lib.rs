//! # Catalog Indexer Pipeline
//!
//! This crate turns a product catalog file into search documents and hands
//! them to the search index.
//!
//! ## Architecture
//!
//! The pipeline follows the Catalog-Processor-Loader pattern:
//!
//! 1. **Catalog**: Reads catalog rows from a delimited file
//! 2. **Processor**: Builds one search document per row (slug, URL, embedding)
//! 3. **Loader**: Provisions the index and uploads documents in batches
//! 4. **Orchestrator**: Drives records through the processor with bounded
//!    concurrency and coordinates the stages

pub mod catalog;
pub mod errors;
pub mod loader;
pub mod orchestrator;
pub mod processor;

pub use catalog::CatalogLoader;
pub use errors::PipelineError;
pub use loader::{IndexMode, LoaderConfig, SearchLoader};
pub use orchestrator::{
    BuildOutcome, FailurePolicy, Orchestrator, OrchestratorConfig, RecordFailure, RunReport,
};
pub use processor::DocumentBuilder;
