//! Azure OpenAI embeddings client.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use super::service_url;
use crate::errors::EmbeddingError;
use crate::interfaces::EmbeddingProvider;

/// Default Azure OpenAI REST API version for embeddings.
pub const DEFAULT_EMBEDDING_API_VERSION: &str = "2023-07-01-preview";

/// Connection settings for an Azure OpenAI embeddings deployment.
#[derive(Clone)]
pub struct AzureOpenAiSettings {
    /// Resource endpoint, e.g. `https://contoso.openai.azure.com`.
    pub endpoint: String,
    pub api_key: String,
    /// Deployment name; doubles as the model identifier.
    pub deployment: String,
    pub api_version: String,
    /// Vector length the deployment produces.
    pub dimensions: usize,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retries after the first attempt for transient failures.
    pub max_retries: u32,
}

impl fmt::Debug for AzureOpenAiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureOpenAiSettings")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"[redacted]")
            .field("deployment", &self.deployment)
            .field("api_version", &self.api_version)
            .field("dimensions", &self.dimensions)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

/// Embedding provider backed by an Azure OpenAI deployment.
///
/// Calls `POST {endpoint}/openai/deployments/{deployment}/embeddings` with one
/// input per request.
///
/// Retry strategy:
/// - HTTP 429 or 5xx → retry with exponential backoff
/// - HTTP 4xx (not 429) → fail immediately
/// - Connect errors and timeouts → retry
/// - Backoff: 500ms, 1s, 2s, 4s, 8s, 16s (capped)
pub struct AzureOpenAiEmbedder {
    client: Client,
    url: Url,
    api_key: String,
    deployment: String,
    dimensions: usize,
    max_retries: u32,
}

impl AzureOpenAiEmbedder {
    /// Build a new embeddings client.
    ///
    /// # Errors
    ///
    /// Returns `EmbeddingError::InvalidInput` if the key or deployment is blank
    /// or the endpoint is not a valid URL.
    pub fn new(settings: AzureOpenAiSettings) -> Result<Self, EmbeddingError> {
        if settings.api_key.trim().is_empty() {
            return Err(EmbeddingError::invalid_input("missing Azure OpenAI API key"));
        }
        if settings.deployment.trim().is_empty() {
            return Err(EmbeddingError::invalid_input("missing embedding deployment name"));
        }

        let endpoint = Url::parse(&settings.endpoint)
            .map_err(|e| EmbeddingError::invalid_input(format!("invalid endpoint: {}", e)))?;
        let url = service_url(
            &endpoint,
            &["openai", "deployments", &settings.deployment, "embeddings"],
            &settings.api_version,
        )
        .ok_or_else(|| EmbeddingError::invalid_input("endpoint cannot carry a path"))?;

        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| EmbeddingError::connection(e.to_string()))?;

        info!(
            url = %url,
            deployment = %settings.deployment,
            dimensions = settings.dimensions,
            "Created Azure OpenAI embeddings client"
        );

        Ok(Self {
            client,
            url,
            api_key: settings.api_key,
            deployment: settings.deployment,
            dimensions: settings.dimensions,
            max_retries: settings.max_retries,
        })
    }

    async fn embed_once(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let response = self
            .client
            .post(self.url.clone())
            .header("api-key", &self.api_key)
            .json(&EmbeddingRequest { input: text })
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(classify_transport_error)?;

        if status.is_success() {
            return parse_embedding_response(&body);
        }

        Err(status_error(status, body))
    }
}

#[async_trait]
impl EmbeddingProvider for AzureOpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::invalid_input("cannot embed empty text"));
        }

        with_retries(self.max_retries, || self.embed_once(text)).await
    }

    fn model_name(&self) -> &str {
        &self.deployment
    }

    fn dims(&self) -> usize {
        self.dimensions
    }
}

/// Run `request` until it succeeds, fails with a non-transient error, or
/// `max_retries` retries have been spent.
async fn with_retries<F, Fut>(
    max_retries: u32,
    mut request: F,
) -> Result<Vec<f32>, EmbeddingError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Vec<f32>, EmbeddingError>>,
{
    let mut attempt = 0u32;
    loop {
        match request().await {
            Ok(vector) => {
                debug!(attempt = attempt, dimensions = vector.len(), "Embedding received");
                return Ok(vector);
            }
            Err(e) if e.is_transient() && attempt < max_retries => {
                attempt += 1;
                let delay = retry_backoff(attempt);
                warn!(
                    attempt = attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Retrying embedding request"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Map a non-success HTTP status to an error. 429 is rate limiting, anything
/// else keeps its status so 5xx stays transient.
fn status_error(status: StatusCode, body: String) -> EmbeddingError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return EmbeddingError::RateLimited(body);
    }

    EmbeddingError::ApiError {
        status: status.as_u16(),
        message: body,
    }
}

/// Delay before retry number `attempt` (1-based).
fn retry_backoff(attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(5);
    Duration::from_millis(500 * (1u64 << exponent))
}

fn classify_transport_error(err: reqwest::Error) -> EmbeddingError {
    if err.is_timeout() {
        EmbeddingError::timeout(err.to_string())
    } else if err.is_decode() {
        EmbeddingError::invalid_response(err.to_string())
    } else {
        EmbeddingError::connection(err.to_string())
    }
}

/// Extract the first embedding from an embeddings response body.
fn parse_embedding_response(body: &str) -> Result<Vec<f32>, EmbeddingError> {
    let mut parsed: EmbeddingResponse = serde_json::from_str(body)
        .map_err(|e| EmbeddingError::invalid_response(format!("failed to parse response: {}", e)))?;

    parsed.data.sort_by_key(|entry| entry.index);

    let first = parsed
        .data
        .into_iter()
        .next()
        .ok_or_else(|| EmbeddingError::invalid_response("response contains no embeddings"))?;

    if first.embedding.is_empty() {
        return Err(EmbeddingError::invalid_response("embedding is empty"));
    }

    Ok(first.embedding)
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}
