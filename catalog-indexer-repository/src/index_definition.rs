//! Product index definition.
//!
//! Describes the schema of the product search index: the key and text fields,
//! the vector field and the algorithms behind it, and the semantic ranking
//! configuration. Rendered into the Azure AI Search REST shape by
//! [`IndexDefinition::to_json`].

use serde_json::{json, Value};

use crate::errors::SearchIndexError;
use catalog_indexer_shared::SearchDocument;

/// Default name of the product index.
pub const DEFAULT_INDEX_NAME: &str = "contoso-products";

/// Vector size produced by `text-embedding-ada-002`.
pub const DEFAULT_VECTOR_DIMENSIONS: usize = 1536;

/// Name of the vector field.
pub const VECTOR_FIELD: &str = "contentVector";

const HNSW_ALGORITHM: &str = "myHnsw";
const HNSW_PROFILE: &str = "myHnswProfile";
const EXHAUSTIVE_KNN_ALGORITHM: &str = "myExhaustiveKnn";
const EXHAUSTIVE_KNN_PROFILE: &str = "myExhaustiveKnnProfile";
const SEMANTIC_CONFIGURATION: &str = "default";

/// Similarity metric used by the vector algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorMetric {
    Cosine,
    Euclidean,
    DotProduct,
}

impl VectorMetric {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Cosine => "cosine",
            Self::Euclidean => "euclidean",
            Self::DotProduct => "dotProduct",
        }
    }
}

/// HNSW graph parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct HnswParameters {
    /// Bi-directional links per node.
    pub m: u32,
    /// Candidate list size while building the graph.
    pub ef_construction: u32,
    /// Candidate list size while searching.
    pub ef_search: u32,
    pub metric: VectorMetric,
}

impl Default for HnswParameters {
    fn default() -> Self {
        Self {
            m: 4,
            ef_construction: 400,
            ef_search: 500,
            metric: VectorMetric::Cosine,
        }
    }
}

/// Schema of the product search index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDefinition {
    /// Index name.
    pub name: String,
    /// Declared length of `contentVector`.
    pub vector_dimensions: usize,
    pub hnsw: HnswParameters,
    /// Metric of the exhaustive KNN fallback profile.
    pub exhaustive_knn_metric: VectorMetric,
}

impl IndexDefinition {
    /// Create a definition with the default algorithm parameters.
    pub fn new(name: impl Into<String>, vector_dimensions: usize) -> Self {
        Self {
            name: name.into(),
            vector_dimensions,
            hnsw: HnswParameters::default(),
            exhaustive_knn_metric: VectorMetric::Cosine,
        }
    }

    /// Replace the HNSW parameters.
    pub fn with_hnsw(mut self, hnsw: HnswParameters) -> Self {
        self.hnsw = hnsw;
        self
    }

    /// Check that a document fits this schema before it is sent.
    ///
    /// The key must be non-empty and the vector length must equal
    /// `vector_dimensions`.
    pub fn validate_document(&self, document: &SearchDocument) -> Result<(), SearchIndexError> {
        if document.id.trim().is_empty() {
            return Err(SearchIndexError::validation("document key is empty"));
        }
        if document.dimensions() != self.vector_dimensions {
            return Err(SearchIndexError::validation(format!(
                "document {} has a {}-dimensional {}, index expects {}",
                document.id,
                document.dimensions(),
                VECTOR_FIELD,
                self.vector_dimensions
            )));
        }
        Ok(())
    }

    /// Render the definition as an Azure AI Search index body.
    ///
    /// The configuration includes:
    /// - **Key and text fields**: `id` (key), searchable `content` and `title`,
    ///   stored `filepath` and `url`
    /// - **Vector field**: `contentVector` bound to the HNSW profile
    /// - **Vector search**: HNSW plus an exhaustive KNN profile
    /// - **Semantic ranking**: `title` as title field, `content` as content field
    pub fn to_json(&self) -> Value {
        json!({
            "name": self.name,
            "fields": [
                {
                    "name": "id",
                    "type": "Edm.String",
                    "key": true,
                    "filterable": true
                },
                {
                    "name": "content",
                    "type": "Edm.String",
                    "searchable": true
                },
                {
                    "name": "filepath",
                    "type": "Edm.String"
                },
                {
                    "name": "title",
                    "type": "Edm.String",
                    "searchable": true
                },
                {
                    "name": "url",
                    "type": "Edm.String"
                },
                {
                    "name": VECTOR_FIELD,
                    "type": "Collection(Edm.Single)",
                    "searchable": true,
                    "dimensions": self.vector_dimensions,
                    "vectorSearchProfile": HNSW_PROFILE
                }
            ],
            "semantic": {
                "configurations": [
                    {
                        "name": SEMANTIC_CONFIGURATION,
                        "prioritizedFields": {
                            "titleField": { "fieldName": "title" },
                            "prioritizedContentFields": [ { "fieldName": "content" } ],
                            "prioritizedKeywordsFields": []
                        }
                    }
                ]
            },
            "vectorSearch": {
                "algorithms": [
                    {
                        "name": HNSW_ALGORITHM,
                        "kind": "hnsw",
                        "hnswParameters": {
                            "m": self.hnsw.m,
                            "efConstruction": self.hnsw.ef_construction,
                            "efSearch": self.hnsw.ef_search,
                            "metric": self.hnsw.metric.as_str()
                        }
                    },
                    {
                        "name": EXHAUSTIVE_KNN_ALGORITHM,
                        "kind": "exhaustiveKnn",
                        "exhaustiveKnnParameters": {
                            "metric": self.exhaustive_knn_metric.as_str()
                        }
                    }
                ],
                "profiles": [
                    {
                        "name": HNSW_PROFILE,
                        "algorithm": HNSW_ALGORITHM
                    },
                    {
                        "name": EXHAUSTIVE_KNN_PROFILE,
                        "algorithm": EXHAUSTIVE_KNN_ALGORITHM
                    }
                ]
            }
        })
    }
}
