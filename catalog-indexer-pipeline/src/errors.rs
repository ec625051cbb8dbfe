//! Error types for the catalog indexer pipeline.

use std::path::PathBuf;

use catalog_indexer_repository::{EmbeddingError, SearchIndexError};
use thiserror::Error;

/// Errors that can occur in the catalog indexer pipeline.
///
/// `NotFound` and `FormatError` are structural and abort a run.
/// `ValidationError` and `EmbeddingError` belong to a single record.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The catalog file does not exist.
    #[error("Catalog not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The catalog is unreadable or violates its schema.
    #[error("Format error: {0}")]
    FormatError(String),

    /// A record failed semantic validation while building its document.
    #[error("Validation error for record {record_id} (document build): {message}")]
    ValidationError { record_id: String, message: String },

    /// The embedding collaborator failed for a record.
    #[error("Embedding error for record {record_id} (document build): {source}")]
    EmbeddingError {
        record_id: String,
        #[source]
        source: EmbeddingError,
    },

    /// The search index collaborator failed.
    #[error("Index error: {0}")]
    IndexError(#[from] SearchIndexError),
}

impl PipelineError {
    /// Create a format error.
    pub fn format(msg: impl Into<String>) -> Self {
        Self::FormatError(msg.into())
    }

    /// Create a validation error for a record.
    pub fn validation(record_id: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::ValidationError {
            record_id: record_id.into(),
            message: msg.into(),
        }
    }

    /// Create an embedding error for a record.
    pub fn embedding(record_id: impl Into<String>, source: EmbeddingError) -> Self {
        Self::EmbeddingError {
            record_id: record_id.into(),
            source,
        }
    }

    /// The id of the record this error belongs to, if it is a per-record error.
    pub fn record_id(&self) -> Option<&str> {
        match self {
            Self::ValidationError { record_id, .. } | Self::EmbeddingError { record_id, .. } => {
                Some(record_id)
            }
            _ => None,
        }
    }

    /// Whether the error aborts the whole run regardless of failure policy.
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::FormatError(_))
    }
}
