//! # Catalog Indexer
//!
//! Main library for the product catalog search indexer.
//!
//! This crate provides the configuration, dependency wiring and run report
//! for the catalog indexer pipeline.

pub mod config;
pub mod report;

pub use config::{Dependencies, IndexerConfig};
pub use report::RunSummary;

use thiserror::Error;

/// Errors that can occur during indexer initialization or execution.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// A required configuration value is absent.
    #[error("Missing required configuration: {0}")]
    MissingConfig(&'static str),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    PipelineError(#[from] catalog_indexer_pipeline::PipelineError),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
