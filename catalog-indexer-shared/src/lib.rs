//! # Catalog Indexer Shared
//!
//! Types shared by every stage of the product catalog indexer: the catalog
//! rows read from disk and the search documents handed to the index.

mod catalog;
mod document;

pub use catalog::CatalogRecord;
pub use document::{product_url, slugify, SearchDocument, PRODUCT_URL_PREFIX};
