//! Embedding error types.

use thiserror::Error;

/// Errors reported by an embedding provider.
///
/// Callers treat every variant the same way (the record that needed the
/// embedding fails). The variants let the provider's own retry policy tell
/// transient failures from permanent ones.
#[derive(Debug, Clone, Error)]
pub enum EmbeddingError {
    /// The request never produced a response (DNS, TLS, connect, reset).
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The request exceeded its deadline.
    #[error("Embedding request timed out: {0}")]
    Timeout(String),

    /// The service answered 429.
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// The service answered with any other non-success status.
    #[error("Embedding API error {status}: {message}")]
    ApiError { status: u16, message: String },

    /// The response body did not contain a usable embedding.
    #[error("Invalid embedding response: {0}")]
    InvalidResponse(String),

    /// The embedding has a different length than the index expects.
    #[error("Embedding has {actual} dimensions, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The input text was rejected before calling the service.
    #[error("Invalid embedding input: {0}")]
    InvalidInput(String),
}

impl EmbeddingError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a timeout error.
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create an invalid response error.
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a dimension mismatch error.
    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch { expected, actual }
    }

    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::ConnectionError(_) | Self::Timeout(_) | Self::RateLimited(_) => true,
            Self::ApiError { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
