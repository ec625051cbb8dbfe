//! Search document model.
//!
//! A `SearchDocument` is the normalized record uploaded to the vector index.
//! Field names on the wire match the index schema (`contentVector` is camel
//! cased), so the struct serializes directly into an upload payload.

use serde::{Deserialize, Serialize};

/// Path prefix of every product URL.
pub const PRODUCT_URL_PREFIX: &str = "/products/";

/// Document stored in the product search index.
///
/// Built once per catalog record and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchDocument {
    /// String form of the catalog id; the index key.
    pub id: String,
    /// Verbatim product description.
    pub content: String,
    /// Slug derived from the product name.
    pub filepath: String,
    /// Verbatim product name.
    pub title: String,
    /// `/products/{slug}`.
    pub url: String,
    /// Embedding of `content`.
    #[serde(rename = "contentVector")]
    pub content_vector: Vec<f32>,
}

impl SearchDocument {
    /// Assemble a document from its parts, deriving `filepath` and `url` from
    /// `title`.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        content_vector: Vec<f32>,
    ) -> Self {
        let title = title.into();
        let filepath = slugify(&title);
        let url = product_url(&filepath);

        Self {
            id: id.into(),
            content: content.into(),
            filepath,
            title,
            url,
            content_vector,
        }
    }

    /// Number of dimensions of the content vector.
    pub fn dimensions(&self) -> usize {
        self.content_vector.len()
    }
}

/// Derive a slug from a product name: lowercase, spaces replaced by hyphens.
///
/// Only the ASCII space is replaced. Punctuation and non-ASCII characters
/// pass through unchanged.
pub fn slugify(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

/// Build the product URL for a slug.
pub fn product_url(slug: &str) -> String {
    format!("{}{}", PRODUCT_URL_PREFIX, slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_simple_name() {
        assert_eq!(slugify("Mountain Bike"), "mountain-bike");
        assert_eq!(product_url(&slugify("Mountain Bike")), "/products/mountain-bike");
    }

    #[test]
    fn test_slugify_keeps_punctuation_and_unicode() {
        assert_eq!(slugify("Café Stove, 2-Burner"), "café-stove,-2-burner");
        assert_eq!(slugify("TrailWalker  Boots"), "trailwalker--boots");
    }

    #[test]
    fn test_slugify_only_replaces_ascii_space() {
        assert_eq!(slugify("Tab\tName"), "tab\tname");
    }

    #[test]
    fn test_document_derives_filepath_and_url() {
        let doc = SearchDocument::new("7", "Trail Mug", "Insulated steel mug", vec![0.5, 0.25]);

        assert_eq!(doc.id, "7");
        assert_eq!(doc.title, "Trail Mug");
        assert_eq!(doc.content, "Insulated steel mug");
        assert_eq!(doc.filepath, "trail-mug");
        assert_eq!(doc.url, "/products/trail-mug");
        assert_eq!(doc.dimensions(), 2);
    }

    #[test]
    fn test_document_serializes_index_field_names() {
        let doc = SearchDocument::new("1", "Sun Hat", "Wide-brim sun hat", vec![0.5]);
        let value = serde_json::to_value(&doc).unwrap();

        assert_eq!(value["id"], "1");
        assert_eq!(value["filepath"], "sun-hat");
        assert_eq!(value["url"], "/products/sun-hat");
        assert!(value["contentVector"].is_array());
        assert!(value.get("content_vector").is_none());
    }
}
