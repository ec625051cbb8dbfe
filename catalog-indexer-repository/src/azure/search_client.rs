//! Azure AI Search client implementation.
//!
//! This module provides the concrete implementation of `SearchIndexProvider`
//! on top of the Azure AI Search REST API.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info, instrument};
use url::Url;

use super::service_url;
use crate::errors::SearchIndexError;
use crate::index_definition::IndexDefinition;
use crate::interfaces::SearchIndexProvider;
use crate::types::{BatchOperationResult, BatchOperationSummary};
use catalog_indexer_shared::SearchDocument;

/// Default Azure AI Search REST API version.
pub const DEFAULT_SEARCH_API_VERSION: &str = "2023-11-01";

const UPLOAD_ACTION: &str = "upload";

/// Azure AI Search client implementation.
///
/// # Example
///
/// ```ignore
/// let client = AzureSearchClient::new(
///     "https://contoso.search.windows.net",
///     "admin-key",
///     DEFAULT_SEARCH_API_VERSION,
///     Duration::from_secs(30),
/// )?;
/// client.delete_index("contoso-products").await?;
/// client.create_or_update_index(&IndexDefinition::new("contoso-products", 1536)).await?;
/// ```
pub struct AzureSearchClient {
    client: Client,
    endpoint: Url,
    api_key: String,
    api_version: String,
}

impl AzureSearchClient {
    /// Create a new client for the search service at `endpoint`.
    ///
    /// # Returns
    ///
    /// * `Ok(AzureSearchClient)` - A new client instance
    /// * `Err(SearchIndexError)` - If the endpoint is not a valid URL or the HTTP client cannot be built
    pub fn new(
        endpoint: &str,
        api_key: impl Into<String>,
        api_version: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SearchIndexError> {
        let endpoint =
            Url::parse(endpoint).map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let api_version = api_version.into();

        info!(
            endpoint = %endpoint,
            api_version = %api_version,
            "Created Azure AI Search client"
        );

        Ok(Self {
            client,
            endpoint,
            api_key: api_key.into(),
            api_version,
        })
    }

    fn url(&self, segments: &[&str]) -> Result<Url, SearchIndexError> {
        service_url(&self.endpoint, segments, &self.api_version).ok_or_else(|| {
            SearchIndexError::connection(format!("endpoint {} cannot carry a path", self.endpoint))
        })
    }

    /// Build the body of an indexing request: every document tagged with the upload action.
    fn upload_body(documents: &[SearchDocument]) -> Result<Value, SearchIndexError> {
        let mut actions = Vec::with_capacity(documents.len());

        for document in documents {
            let mut value = serde_json::to_value(document)
                .map_err(|e| SearchIndexError::validation(e.to_string()))?;
            if let Value::Object(ref mut fields) = value {
                fields.insert("@search.action".to_string(), Value::from(UPLOAD_ACTION));
            }
            actions.push(value);
        }

        Ok(serde_json::json!({ "value": actions }))
    }

    /// Map the per-document statuses of an indexing response onto `documents`.
    ///
    /// Results are matched by key so the summary follows the order of
    /// `documents`. A document the service did not report on counts as failed.
    fn parse_upload_response(
        body: &str,
        documents: &[SearchDocument],
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        let response: IndexingResponse =
            serde_json::from_str(body).map_err(|e| SearchIndexError::parse(e.to_string()))?;

        let mut by_key: HashMap<String, IndexingResult> = response
            .value
            .into_iter()
            .map(|result| (result.key.clone(), result))
            .collect();

        let results = documents
            .iter()
            .map(|document| match by_key.remove(&document.id) {
                Some(result) if result.status => {
                    BatchOperationResult::succeeded(document.id.clone(), Some(result.status_code))
                }
                Some(result) => BatchOperationResult::failed(
                    document.id.clone(),
                    Some(result.status_code),
                    SearchIndexError::index(
                        result
                            .error_message
                            .unwrap_or_else(|| format!("rejected with status {}", result.status_code)),
                    ),
                ),
                None => BatchOperationResult::failed(
                    document.id.clone(),
                    None,
                    SearchIndexError::index("no status returned for document"),
                ),
            })
            .collect();

        Ok(BatchOperationSummary::from_results(results))
    }

    async fn error_body(response: reqwest::Response) -> String {
        response.text().await.unwrap_or_default()
    }
}

#[async_trait]
impl SearchIndexProvider for AzureSearchClient {
    #[instrument(skip(self))]
    async fn index_exists(&self, name: &str) -> Result<bool, SearchIndexError> {
        let response = self
            .client
            .get(self.url(&["indexes", name])?)
            .header("api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => {
                let body = Self::error_body(response).await;
                error!(status = %status, body = %body, "Index lookup failed");
                Err(SearchIndexError::index_definition(format!(
                    "Index lookup failed with status {}: {}",
                    status, body
                )))
            }
        }
    }

    #[instrument(skip(self))]
    async fn delete_index(&self, name: &str) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .delete(self.url(&["indexes", name])?)
            .header("api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status();

        // 404 is acceptable - index may not exist
        if !status.is_success() && status != StatusCode::NOT_FOUND {
            let body = Self::error_body(response).await;
            error!(status = %status, body = %body, "Delete index request failed");
            return Err(SearchIndexError::index_definition(format!(
                "Delete index failed with status {}: {}",
                status, body
            )));
        }

        debug!(index = %name, "Index deleted");
        Ok(())
    }

    #[instrument(skip(self, definition), fields(index = %definition.name))]
    async fn create_or_update_index(
        &self,
        definition: &IndexDefinition,
    ) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .put(self.url(&["indexes", &definition.name])?)
            .header("api-key", &self.api_key)
            .json(&definition.to_json())
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = Self::error_body(response).await;
            error!(status = %status, body = %body, "Create index request failed");
            return Err(SearchIndexError::index_definition(format!(
                "Create index failed with status {}: {}",
                status, body
            )));
        }

        debug!(status = %status, "Index created or updated");
        Ok(())
    }

    #[instrument(skip(self, documents), fields(count = documents.len()))]
    async fn upload_documents(
        &self,
        index_name: &str,
        documents: &[SearchDocument],
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        if documents.is_empty() {
            return Ok(BatchOperationSummary::empty());
        }

        let body = Self::upload_body(documents)?;

        let response = self
            .client
            .post(self.url(&["indexes", index_name, "docs", "index"])?)
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status();

        // 207 Multi-Status: some documents were rejected, details are per document
        if status != StatusCode::OK && status != StatusCode::MULTI_STATUS {
            let body = Self::error_body(response).await;
            error!(status = %status, body = %body, "Upload request failed");
            return Err(SearchIndexError::bulk_operation(format!(
                "Upload failed with status {}: {}",
                status, body
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))?;

        Self::parse_upload_response(&text, documents)
    }
}

#[derive(Debug, Deserialize)]
struct IndexingResponse {
    value: Vec<IndexingResult>,
}

#[derive(Debug, Deserialize)]
struct IndexingResult {
    key: String,
    status: bool,
    #[serde(rename = "errorMessage")]
    error_message: Option<String>,
    #[serde(rename = "statusCode")]
    status_code: u16,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn docs() -> Vec<SearchDocument> {
        vec![
            SearchDocument::new("1", "Trail Mug", "Insulated steel mug", vec![0.1, 0.2]),
            SearchDocument::new("2", "Sun Hat", "Wide-brim sun hat", vec![0.1, 0.2]),
        ]
    }

    #[test]
    fn test_upload_body_tags_every_document() {
        let body = AzureSearchClient::upload_body(&docs()).unwrap();
        let actions = body["value"].as_array().unwrap();

        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0]["@search.action"], "upload");
        assert_eq!(actions[0]["id"], "1");
        assert_eq!(actions[0]["filepath"], "trail-mug");
        assert_eq!(actions[1]["url"], "/products/sun-hat");
        assert_eq!(actions[1]["contentVector"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_parse_upload_response_all_succeeded() {
        let body = json!({
            "value": [
                { "key": "1", "status": true, "errorMessage": null, "statusCode": 201 },
                { "key": "2", "status": true, "errorMessage": null, "statusCode": 200 }
            ]
        })
        .to_string();

        let summary = AzureSearchClient::parse_upload_response(&body, &docs()).unwrap();

        assert_eq!(summary.total, 2);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.results[0].status_code, Some(201));
    }

    #[test]
    fn test_parse_upload_response_partial_failure_out_of_order() {
        let body = json!({
            "value": [
                { "key": "2", "status": false, "errorMessage": "Vector too long", "statusCode": 400 },
                { "key": "1", "status": true, "errorMessage": null, "statusCode": 201 }
            ]
        })
        .to_string();

        let summary = AzureSearchClient::parse_upload_response(&body, &docs()).unwrap();

        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.results[0].key, "1");
        assert!(summary.results[0].success);
        assert_eq!(summary.results[1].key, "2");
        assert_eq!(summary.results[1].status_code, Some(400));
        assert!(summary.results[1]
            .error
            .as_ref()
            .unwrap()
            .to_string()
            .contains("Vector too long"));
    }

    #[test]
    fn test_parse_upload_response_missing_key() {
        let body = json!({
            "value": [
                { "key": "1", "status": true, "statusCode": 201 }
            ]
        })
        .to_string();

        let summary = AzureSearchClient::parse_upload_response(&body, &docs()).unwrap();

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.results[1].key, "2");
        assert!(summary.results[1].status_code.is_none());
    }

    #[test]
    fn test_parse_upload_response_invalid() {
        let result = AzureSearchClient::parse_upload_response("not json", &docs());
        assert!(matches!(result, Err(SearchIndexError::ParseError(_))));
    }

    #[test]
    fn test_new_rejects_invalid_endpoint() {
        let result = AzureSearchClient::new("not a url", "key", "2023-11-01", Duration::from_secs(5));
        assert!(matches!(result, Err(SearchIndexError::ConnectionError(_))));
    }
}
