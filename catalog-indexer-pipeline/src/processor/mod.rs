//! Processor module for the catalog indexer pipeline.
//!
//! Transforms catalog records into search documents.

mod document_builder;

pub use document_builder::DocumentBuilder;
