//! Azure implementations of the collaborator interfaces.
//!
//! - [`AzureSearchClient`] implements `SearchIndexProvider` on the Azure AI Search REST API.
//! - [`AzureOpenAiEmbedder`] implements `EmbeddingProvider` on an Azure OpenAI embeddings deployment.

mod embedder;
mod search_client;

pub use embedder::{AzureOpenAiEmbedder, AzureOpenAiSettings, DEFAULT_EMBEDDING_API_VERSION};
pub use search_client::{AzureSearchClient, DEFAULT_SEARCH_API_VERSION};

use url::Url;

/// Append path segments and the `api-version` query parameter to a service endpoint.
///
/// Segments are percent-encoded, and a trailing slash on the endpoint is ignored.
pub(crate) fn service_url(base: &Url, segments: &[&str], api_version: &str) -> Option<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .ok()?
        .pop_if_empty()
        .extend(segments);
    url.query_pairs_mut().append_pair("api-version", api_version);
    Some(url)
}
