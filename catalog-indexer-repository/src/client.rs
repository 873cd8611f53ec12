//! Search index client implementation.
//!
//! This module provides the main client for interacting with the search index.
//! Application code uses this to prepare the index, write documents and query it.

use serde_json::Value;

use crate::config::SearchIndexConfig;
use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::types::BatchOperationSummary;
use catalog_indexer_shared::ProductDocument;

/// Outcome of `SearchIndexClient::ensure_index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexStatus {
    /// The index was already present.
    Existing,
    /// The index was created by this call.
    Created,
}

/// The main client for interacting with the search index.
///
/// Bound to a single index, named in its `SearchIndexConfig`.
pub struct SearchIndexClient {
    provider: Box<dyn SearchIndexProvider>,
    config: SearchIndexConfig,
}

impl SearchIndexClient {
    /// Create a new SearchIndexClient with default configuration.
    pub fn new(provider: Box<dyn SearchIndexProvider>) -> Self {
        Self {
            provider,
            config: SearchIndexConfig::default(),
        }
    }

    /// Create a new SearchIndexClient with custom configuration.
    pub fn with_config(provider: Box<dyn SearchIndexProvider>, config: SearchIndexConfig) -> Self {
        Self { provider, config }
    }

    /// Name of the index this client writes to.
    pub fn index_name(&self) -> &str {
        &self.config.index_name
    }

    /// Check if batch size exceeds the configured limit.
    fn validate_batch_size(&self, size: usize) -> Result<(), SearchIndexError> {
        if let Some(max) = self.config.max_batch_size {
            if size > max {
                return Err(SearchIndexError::batch_size_exceeded(size, max));
            }
        }
        Ok(())
    }

    fn validate_index_name(&self) -> Result<(), SearchIndexError> {
        if self.config.index_name.trim().is_empty() {
            return Err(SearchIndexError::validation("index name is required"));
        }
        Ok(())
    }

    /// Create the index if it does not exist yet.
    ///
    /// No mapping is supplied; the engine types fields dynamically.
    pub async fn ensure_index(&self) -> Result<IndexStatus, SearchIndexError> {
        self.validate_index_name()?;

        if self.provider.index_exists(&self.config.index_name).await? {
            return Ok(IndexStatus::Existing);
        }

        self.provider.create_index(&self.config.index_name).await?;
        Ok(IndexStatus::Created)
    }

    /// Write a batch of documents, replacing documents with the same identity.
    /// Input: documents keyed by `product_id`
    /// Output: Result<BatchOperationSummary, SearchIndexError>
    ///
    /// Individual failures are reported in the summary. The batch size is
    /// limited by the configured max_batch_size (default: 1000).
    pub async fn bulk_upsert(
        &self,
        documents: &[ProductDocument],
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        if documents.is_empty() {
            return Ok(BatchOperationSummary::default());
        }

        self.validate_index_name()?;
        self.validate_batch_size(documents.len())?;

        self.provider
            .bulk_index_documents(&self.config.index_name, documents)
            .await
    }

    /// Forward a raw query body to an index and return the raw hits.
    pub async fn search(&self, index: &str, query: &Value) -> Result<Vec<Value>, SearchIndexError> {
        if index.trim().is_empty() {
            return Err(SearchIndexError::validation("index name is required"));
        }
        self.provider.search(index, query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BatchOperationResult;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    /// Mock provider for testing
    #[derive(Default)]
    struct MockProvider {
        existing: Arc<Mutex<Vec<String>>>,
        created: Arc<Mutex<Vec<String>>>,
        indexed: Arc<Mutex<Vec<ProductDocument>>>,
        reject_ids: Vec<i64>,
        should_fail: bool,
    }

    #[async_trait]
    impl SearchIndexProvider for MockProvider {
        async fn index_exists(&self, index: &str) -> Result<bool, SearchIndexError> {
            Ok(self.existing.lock().await.iter().any(|i| i == index))
        }

        async fn create_index(&self, index: &str) -> Result<(), SearchIndexError> {
            self.created.lock().await.push(index.to_string());
            self.existing.lock().await.push(index.to_string());
            Ok(())
        }

        async fn bulk_index_documents(
            &self,
            _index: &str,
            documents: &[ProductDocument],
        ) -> Result<BatchOperationSummary, SearchIndexError> {
            if self.should_fail {
                return Err(SearchIndexError::bulk_transport("Mock failure"));
            }

            let mut results = Vec::new();
            for doc in documents {
                if self.reject_ids.contains(&doc.product_id) {
                    results.push(BatchOperationResult::failed(
                        doc.document_id(),
                        Some(400),
                        "rejected",
                    ));
                } else {
                    self.indexed.lock().await.push(doc.clone());
                    results.push(BatchOperationResult::succeeded(doc.document_id(), Some(201)));
                }
            }
            Ok(BatchOperationSummary::from_results(results))
        }

        async fn search(
            &self,
            _index: &str,
            query: &Value,
        ) -> Result<Vec<Value>, SearchIndexError> {
            Ok(vec![json!({ "_source": query })])
        }
    }

    fn documents(count: i64) -> Vec<ProductDocument> {
        (1..=count).map(ProductDocument::new).collect()
    }

    #[tokio::test]
    async fn test_ensure_index_creates_when_absent() {
        let provider = MockProvider::default();
        let created = provider.created.clone();
        let client = SearchIndexClient::new(Box::new(provider));

        assert_eq!(client.ensure_index().await.unwrap(), IndexStatus::Created);
        assert_eq!(client.ensure_index().await.unwrap(), IndexStatus::Existing);
        assert_eq!(created.lock().await.as_slice(), ["products".to_string()]);
    }

    #[tokio::test]
    async fn test_ensure_index_rejects_blank_name() {
        let client = SearchIndexClient::with_config(
            Box::new(MockProvider::default()),
            SearchIndexConfig::new("  "),
        );

        let result = client.ensure_index().await;
        assert!(matches!(result, Err(SearchIndexError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_bulk_upsert_empty() {
        let client = SearchIndexClient::new(Box::new(MockProvider::default()));

        let result = client.bulk_upsert(&[]).await.unwrap();

        assert_eq!(result.total, 0);
        assert!(result.results.is_empty());
    }

    #[tokio::test]
    async fn test_bulk_upsert_partial_failure() {
        let provider = MockProvider {
            reject_ids: vec![2],
            ..Default::default()
        };
        let indexed = provider.indexed.clone();
        let client = SearchIndexClient::new(Box::new(provider));

        let result = client.bulk_upsert(&documents(3)).await.unwrap();

        assert_eq!(result.succeeded, 2);
        assert_eq!(result.failed, 1);
        assert_eq!(indexed.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn test_bulk_upsert_batch_size_exceeded() {
        let config = SearchIndexConfig::new("products").with_max_batch_size(5);
        let client = SearchIndexClient::with_config(Box::new(MockProvider::default()), config);

        let result = client.bulk_upsert(&documents(10)).await;
        assert!(matches!(
            result.unwrap_err(),
            SearchIndexError::BatchSizeExceeded {
                provided: 10,
                max: 5
            }
        ));
    }

    #[tokio::test]
    async fn test_bulk_upsert_unlimited() {
        let config = SearchIndexConfig::new("products").unlimited();
        let client = SearchIndexClient::with_config(Box::new(MockProvider::default()), config);

        let result = client.bulk_upsert(&documents(1500)).await.unwrap();
        assert_eq!(result.succeeded, 1500);
    }

    #[tokio::test]
    async fn test_bulk_upsert_transport_failure() {
        let provider = MockProvider {
            should_fail: true,
            ..Default::default()
        };
        let client = SearchIndexClient::new(Box::new(provider));

        let result = client.bulk_upsert(&documents(1)).await;
        assert!(matches!(
            result,
            Err(SearchIndexError::BulkTransportError(_))
        ));
    }

    #[tokio::test]
    async fn test_search_forwards_query_verbatim() {
        let client = SearchIndexClient::new(Box::new(MockProvider::default()));
        let query = json!({ "query": { "match": { "name": "widget" } } });

        let hits = client.search("products", &query).await.unwrap();

        assert_eq!(hits, vec![json!({ "_source": query })]);
    }
}
