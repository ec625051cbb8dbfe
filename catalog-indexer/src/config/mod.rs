//! Configuration for the catalog indexer.
//!
//! [`IndexerConfig`] is built once, from the process environment or any other
//! key/value source, and passed explicitly into [`Dependencies`].

mod dependencies;

pub use dependencies::Dependencies;

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::IndexingError;
use catalog_indexer_pipeline::orchestrator::DEFAULT_CONCURRENCY;
use catalog_indexer_pipeline::{FailurePolicy, IndexMode};
use catalog_indexer_repository::azure::{DEFAULT_EMBEDDING_API_VERSION, DEFAULT_SEARCH_API_VERSION};
use catalog_indexer_repository::config::SERVICE_MAX_BATCH_SIZE;
use catalog_indexer_repository::index_definition::{DEFAULT_INDEX_NAME, DEFAULT_VECTOR_DIMENSIONS};

/// Default location of the product catalog.
pub const DEFAULT_CATALOG_PATH: &str = "data/product_info/products.csv";

/// Embedding deployment used when `EMBEDDING_MODEL` is not set.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";

/// Default timeout for a single HTTP request, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default number of retries for transient embedding failures.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Environment variable names.
pub mod vars {
    pub const EMBEDDING_ENDPOINT: &str = "CONTOSO_AI_SERVICES_ENDPOINT";
    pub const EMBEDDING_KEY: &str = "CONTOSO_AI_SERVICES_KEY";
    pub const SEARCH_ENDPOINT: &str = "CONTOSO_SEARCH_ENDPOINT";
    pub const SEARCH_KEY: &str = "CONTOSO_SEARCH_KEY";
    pub const EMBEDDING_MODEL: &str = "EMBEDDING_MODEL";
    pub const CATALOG_PATH: &str = "PRODUCT_CATALOG_PATH";
    pub const INDEX_NAME: &str = "PRODUCT_INDEX_NAME";
    pub const EMBEDDING_API_VERSION: &str = "EMBEDDING_API_VERSION";
    pub const SEARCH_API_VERSION: &str = "SEARCH_API_VERSION";
    pub const EMBEDDING_DIMENSIONS: &str = "EMBEDDING_DIMENSIONS";
    pub const CONCURRENCY: &str = "INDEXER_CONCURRENCY";
    pub const FAILURE_POLICY: &str = "INDEXER_FAILURE_POLICY";
    pub const INDEX_MODE: &str = "INDEXER_INDEX_MODE";
    pub const UPLOAD_BATCH_SIZE: &str = "UPLOAD_BATCH_SIZE";
    pub const EMBED_TIMEOUT_SECS: &str = "EMBED_TIMEOUT_SECS";
    pub const REQUEST_TIMEOUT_SECS: &str = "REQUEST_TIMEOUT_SECS";
    pub const MAX_RETRIES: &str = "EMBEDDING_MAX_RETRIES";
}

/// Settings for one indexer run.
///
/// Required values are kept as strings and may be empty until
/// [`validate`](Self::validate) is called; everything else has a default.
#[derive(Clone)]
pub struct IndexerConfig {
    pub embedding_endpoint: String,
    pub embedding_key: String,
    pub search_endpoint: String,
    pub search_key: String,
    /// Embedding deployment name.
    pub model_identifier: String,
    pub catalog_path: PathBuf,
    pub index_name: String,
    pub embedding_api_version: String,
    pub search_api_version: String,
    pub embedding_dimensions: usize,
    pub concurrency: usize,
    pub failure_policy: FailurePolicy,
    pub index_mode: IndexMode,
    pub upload_batch_size: usize,
    /// Per-record embedding deadline enforced by the document builder.
    pub embed_timeout: Option<Duration>,
    /// Timeout of every HTTP request.
    pub request_timeout: Duration,
    pub max_retries: u32,
}

impl IndexerConfig {
    /// Create a configuration with the required values and defaults for the rest.
    pub fn new(
        embedding_endpoint: impl Into<String>,
        embedding_key: impl Into<String>,
        search_endpoint: impl Into<String>,
        search_key: impl Into<String>,
        model_identifier: impl Into<String>,
    ) -> Self {
        Self {
            embedding_endpoint: embedding_endpoint.into(),
            embedding_key: embedding_key.into(),
            search_endpoint: search_endpoint.into(),
            search_key: search_key.into(),
            model_identifier: model_identifier.into(),
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            index_name: DEFAULT_INDEX_NAME.to_string(),
            embedding_api_version: DEFAULT_EMBEDDING_API_VERSION.to_string(),
            search_api_version: DEFAULT_SEARCH_API_VERSION.to_string(),
            embedding_dimensions: DEFAULT_VECTOR_DIMENSIONS,
            concurrency: DEFAULT_CONCURRENCY,
            failure_policy: FailurePolicy::default(),
            index_mode: IndexMode::default(),
            upload_batch_size: SERVICE_MAX_BATCH_SIZE,
            embed_timeout: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Build a configuration from the process environment.
    ///
    /// Loads `.env` first if present. `EMBEDDING_MODEL` falls back to
    /// `text-embedding-ada-002`.
    pub fn from_env() -> Result<Self, IndexingError> {
        dotenv::dotenv().ok();

        Self::from_lookup(|key| match env::var(key) {
            Ok(value) => Some(value),
            Err(_) if key == vars::EMBEDDING_MODEL => Some(DEFAULT_EMBEDDING_MODEL.to_string()),
            Err(_) => None,
        })
    }

    /// Build a configuration from any key/value lookup using the environment
    /// variable names in [`vars`].
    ///
    /// Blank values count as absent. Absent required values are left empty for
    /// [`validate`](Self::validate) to report.
    ///
    /// # Errors
    ///
    /// Returns `IndexingError::ConfigError` if a value cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, IndexingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::new(
            get(vars::EMBEDDING_ENDPOINT).unwrap_or_default(),
            get(vars::EMBEDDING_KEY).unwrap_or_default(),
            get(vars::SEARCH_ENDPOINT).unwrap_or_default(),
            get(vars::SEARCH_KEY).unwrap_or_default(),
            get(vars::EMBEDDING_MODEL).unwrap_or_default(),
        );

        if let Some(path) = get(vars::CATALOG_PATH) {
            config.catalog_path = PathBuf::from(path);
        }
        if let Some(name) = get(vars::INDEX_NAME) {
            config.index_name = name;
        }
        if let Some(version) = get(vars::EMBEDDING_API_VERSION) {
            config.embedding_api_version = version;
        }
        if let Some(version) = get(vars::SEARCH_API_VERSION) {
            config.search_api_version = version;
        }
        if let Some(value) = get(vars::EMBEDDING_DIMENSIONS) {
            config.embedding_dimensions = parse(vars::EMBEDDING_DIMENSIONS, &value)?;
        }
        if let Some(value) = get(vars::CONCURRENCY) {
            config.concurrency = parse(vars::CONCURRENCY, &value)?;
        }
        if let Some(value) = get(vars::FAILURE_POLICY) {
            config.failure_policy = parse(vars::FAILURE_POLICY, &value)?;
        }
        if let Some(value) = get(vars::INDEX_MODE) {
            config.index_mode = parse(vars::INDEX_MODE, &value)?;
        }
        if let Some(value) = get(vars::UPLOAD_BATCH_SIZE) {
            config.upload_batch_size = parse(vars::UPLOAD_BATCH_SIZE, &value)?;
        }
        if let Some(value) = get(vars::EMBED_TIMEOUT_SECS) {
            let secs = parse(vars::EMBED_TIMEOUT_SECS, &value)?;
            config.embed_timeout = Some(Duration::from_secs(secs));
        }
        if let Some(value) = get(vars::REQUEST_TIMEOUT_SECS) {
            let secs = parse(vars::REQUEST_TIMEOUT_SECS, &value)?;
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(value) = get(vars::MAX_RETRIES) {
            config.max_retries = parse(vars::MAX_RETRIES, &value)?;
        }

        Ok(config)
    }

    /// Check the configuration before any collaborator is built.
    ///
    /// # Errors
    ///
    /// * `IndexingError::MissingConfig` - Naming the first absent required value
    /// * `IndexingError::ConfigError` - For zero sizes or invalid endpoint URLs
    pub fn validate(&self) -> Result<(), IndexingError> {
        let required = [
            ("embeddingEndpoint", &self.embedding_endpoint),
            ("embeddingKey", &self.embedding_key),
            ("searchEndpoint", &self.search_endpoint),
            ("searchKey", &self.search_key),
            ("modelIdentifier", &self.model_identifier),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(IndexingError::MissingConfig(*field));
        }

        for (field, endpoint) in [
            ("embeddingEndpoint", &self.embedding_endpoint),
            ("searchEndpoint", &self.search_endpoint),
        ] {
            let url = Url::parse(endpoint)
                .map_err(|e| IndexingError::config(format!("{} is not a valid URL: {}", field, e)))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(IndexingError::config(format!(
                    "{} must be an http(s) URL, got '{}'",
                    field, endpoint
                )));
            }
        }

        for (field, value) in [
            ("embeddingDimensions", self.embedding_dimensions),
            ("concurrency", self.concurrency),
            ("uploadBatchSize", self.upload_batch_size),
        ] {
            if value == 0 {
                return Err(IndexingError::config(format!("{} must be at least 1", field)));
            }
        }

        if self.upload_batch_size > SERVICE_MAX_BATCH_SIZE {
            return Err(IndexingError::config(format!(
                "uploadBatchSize must be at most {}",
                SERVICE_MAX_BATCH_SIZE
            )));
        }

        if self.request_timeout.is_zero() || self.embed_timeout.is_some_and(|t| t.is_zero()) {
            return Err(IndexingError::config("timeouts must be at least one second"));
        }

        if self.index_name.trim().is_empty() {
            return Err(IndexingError::config("indexName must not be empty"));
        }

        Ok(())
    }
}

impl fmt::Debug for IndexerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexerConfig")
            .field("embedding_endpoint", &self.embedding_endpoint)
            .field("embedding_key", &"[redacted]")
            .field("search_endpoint", &self.search_endpoint)
            .field("search_key", &"[redacted]")
            .field("model_identifier", &self.model_identifier)
            .field("catalog_path", &self.catalog_path)
            .field("index_name", &self.index_name)
            .field("embedding_api_version", &self.embedding_api_version)
            .field("search_api_version", &self.search_api_version)
            .field("embedding_dimensions", &self.embedding_dimensions)
            .field("concurrency", &self.concurrency)
            .field("failure_policy", &self.failure_policy)
            .field("index_mode", &self.index_mode)
            .field("upload_batch_size", &self.upload_batch_size)
            .field("embed_timeout", &self.embed_timeout)
            .field("request_timeout", &self.request_timeout)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

fn parse<T>(key: &str, value: &str) -> Result<T, IndexingError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value
        .parse()
        .map_err(|e| IndexingError::config(format!("invalid value '{}' for {}: {}", value, key, e)))
}
