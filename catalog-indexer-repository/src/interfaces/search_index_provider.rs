//! Search index provider trait definition.
//!
//! This module defines the abstract interface for search index operations,
//! allowing for different backend implementations (OpenSearch, Elasticsearch, etc.).

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::SearchIndexError;
use crate::types::BatchOperationSummary;
use catalog_indexer_shared::ProductDocument;

/// Abstracts the underlying search index implementation (OpenSearch, Elasticsearch, etc.).
///
/// Implementations are injected into `SearchIndexClient` to enable dependency injection
/// and easy testing with mock implementations.
///
/// All methods return `Result<T, SearchIndexError>` for consistent error handling across
/// different backend implementations.
#[async_trait]
pub trait SearchIndexProvider: Send + Sync {
    /// Check whether an index exists.
    ///
    /// # Arguments
    ///
    /// * `index` - Name of the index
    ///
    /// # Returns
    ///
    /// * `Ok(true)` / `Ok(false)` - Whether the index exists
    /// * `Err(SearchIndexError)` - If the check itself fails
    async fn index_exists(&self, index: &str) -> Result<bool, SearchIndexError>;

    /// Create an index without explicit mappings.
    ///
    /// Field types are left to the engine's dynamic mapping.
    async fn create_index(&self, index: &str) -> Result<(), SearchIndexError>;

    /// Write documents in bulk, replacing any document with the same identity.
    ///
    /// A document rejected by the engine does not abort the request; it is
    /// reported as a failed entry in the returned summary.
    ///
    /// # Arguments
    ///
    /// * `index` - Target index
    /// * `documents` - Documents to write, keyed by `product_id`
    ///
    /// # Returns
    ///
    /// * `Ok(BatchOperationSummary)` - Per-document outcome, one entry per document
    /// * `Err(SearchIndexError)` - If the bulk request fails entirely
    async fn bulk_index_documents(
        &self,
        index: &str,
        documents: &[ProductDocument],
    ) -> Result<BatchOperationSummary, SearchIndexError>;

    /// Run a raw query body against an index and return the raw hits.
    async fn search(&self, index: &str, query: &Value) -> Result<Vec<Value>, SearchIndexError>;
}
