//! Embedding provider trait definition.

use async_trait::async_trait;

use crate::errors::EmbeddingError;

/// Turns text into a dense embedding vector.
///
/// Each call is a self-contained request: implementations must not depend on
/// the results of earlier calls. Any retry policy lives inside the
/// implementation, never in its callers.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the batch driver shares a single
/// provider across concurrently running record conversions.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text.
    ///
    /// # Arguments
    ///
    /// * `text` - The text to embed
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<f32>)` - The embedding vector
    /// * `Err(EmbeddingError)` - If the provider fails or returns an unusable response
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Model or deployment identifier (e.g. `"text-embedding-ada-002"`).
    fn model_name(&self) -> &str;

    /// Length of the vectors this provider returns.
    fn dims(&self) -> usize;
}
