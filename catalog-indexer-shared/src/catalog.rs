//! Product catalog record.

use serde::{Deserialize, Serialize};

/// A single product row read from the catalog file.
///
/// Records are immutable once loaded. The loader guarantees that `id` is
/// non-empty and unique within one catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRecord {
    /// Opaque product identifier in its string form.
    pub id: String,
    /// Display title of the product.
    pub name: String,
    /// Free-text description; the text that gets embedded.
    pub description: String,
}

impl CatalogRecord {
    /// Create a new catalog record.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
        }
    }
}
