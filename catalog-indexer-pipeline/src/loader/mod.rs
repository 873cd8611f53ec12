//! Loader module for the catalog indexer pipeline.
//!
//! Writes product documents into the search index.

use std::sync::Arc;
use tracing::{debug, instrument};

use crate::errors::PipelineError;
use crate::logging::RunLog;
use catalog_indexer_repository::{IndexStatus, SearchIndexClient, SearchIndexError};
use catalog_indexer_shared::{LoadResult, ProductDocument};

/// Default number of documents per bulk request.
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Configuration for the bulk loader.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Number of documents sent in one bulk request.
    pub batch_size: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Loader that upserts documents into the search engine.
///
/// The loader is responsible for:
/// - Creating the target index on first use
/// - Splitting the documents into bulk requests
/// - Collecting per-document failures into one `LoadResult`
pub struct BulkLoader {
    client: SearchIndexClient,
    config: LoaderConfig,
    log: Arc<dyn RunLog>,
}

impl BulkLoader {
    /// Create a new loader with the default batch size.
    pub fn new(client: SearchIndexClient, log: Arc<dyn RunLog>) -> Self {
        Self::with_config(client, LoaderConfig::default(), log)
    }

    /// Create a new loader with custom configuration.
    pub fn with_config(client: SearchIndexClient, config: LoaderConfig, log: Arc<dyn RunLog>) -> Self {
        Self { client, config, log }
    }

    pub fn index_name(&self) -> &str {
        self.client.index_name()
    }

    /// Create the target index if it is missing.
    pub async fn ensure_index(&self) -> Result<IndexStatus, PipelineError> {
        let index = self.client.index_name();
        let status = self
            .client
            .ensure_index()
            .await
            .map_err(|e| PipelineError::index(format!("Failed to prepare index '{}': {}", index, e)))?;

        match status {
            IndexStatus::Created => self.log.info(&format!("Creating index '{}'", index)),
            IndexStatus::Existing => self.log.info(&format!("Index '{}' already exists", index)),
        }
        Ok(status)
    }

    /// Upsert every document, keyed by its `product_id`.
    ///
    /// Documents the engine rejects are reported in the returned result and
    /// do not fail the call. A failed request fails the call; chunks already
    /// sent stay written.
    #[instrument(skip_all, fields(index = %self.client.index_name()))]
    pub async fn bulk_upsert<I>(&self, documents: I) -> Result<LoadResult, PipelineError>
    where
        I: IntoIterator<Item = ProductDocument>,
    {
        let batch_size = self.config.batch_size.max(1);
        let mut documents = documents.into_iter();
        let mut result = LoadResult::empty();
        let mut chunk = Vec::with_capacity(batch_size);

        loop {
            chunk.clear();
            chunk.extend(documents.by_ref().take(batch_size));
            if chunk.is_empty() {
                break;
            }

            debug!(count = chunk.len(), "Sending bulk request");
            let summary = self.client.bulk_upsert(&chunk).await.map_err(|e| match e {
                SearchIndexError::BulkTransportError(msg) => PipelineError::bulk_transport(msg),
                other => PipelineError::bulk_transport(other.to_string()),
            })?;
            result.merge(summary.into());
        }

        if result.has_failures() {
            self.log.warn(&format!(
                "Load completed with {} errors. {} products indexed successfully.",
                result.failed_items.len(),
                result.succeeded_count
            ));
        } else {
            self.log.info(&format!(
                "Load completed. {} products indexed successfully.",
                result.succeeded_count
            ));
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{LogLevel, MemoryRunLog};
    use async_trait::async_trait;
    use catalog_indexer_repository::{
        BatchOperationResult, BatchOperationSummary, SearchIndexConfig, SearchIndexProvider,
    };
    use serde_json::Value;
    use std::sync::Mutex;

    /// Mock provider recording every bulk request.
    #[derive(Default)]
    struct MockProvider {
        exists: bool,
        batches: Arc<Mutex<Vec<Vec<i64>>>>,
        reject_ids: Vec<i64>,
        fail_on_batch: Option<usize>,
    }

    #[async_trait]
    impl SearchIndexProvider for MockProvider {
        async fn index_exists(&self, _index: &str) -> Result<bool, SearchIndexError> {
            Ok(self.exists)
        }

        async fn create_index(&self, _index: &str) -> Result<(), SearchIndexError> {
            Ok(())
        }

        async fn bulk_index_documents(
            &self,
            _index: &str,
            documents: &[ProductDocument],
        ) -> Result<BatchOperationSummary, SearchIndexError> {
            let mut batches = self.batches.lock().unwrap();
            if self.fail_on_batch == Some(batches.len()) {
                return Err(SearchIndexError::bulk_transport("connection reset by peer"));
            }
            batches.push(documents.iter().map(|d| d.product_id).collect());

            let results = documents
                .iter()
                .map(|d| {
                    if self.reject_ids.contains(&d.product_id) {
                        BatchOperationResult::failed(d.document_id(), Some(400), "mapper_parsing_exception")
                    } else {
                        BatchOperationResult::succeeded(d.document_id(), Some(201))
                    }
                })
                .collect();
            Ok(BatchOperationSummary::from_results(results))
        }

        async fn search(&self, _index: &str, _query: &Value) -> Result<Vec<Value>, SearchIndexError> {
            Ok(Vec::new())
        }
    }

    fn documents(count: i64) -> Vec<ProductDocument> {
        (1..=count).map(ProductDocument::new).collect()
    }

    fn loader(provider: MockProvider, batch_size: usize, log: Arc<MemoryRunLog>) -> BulkLoader {
        let client = SearchIndexClient::with_config(Box::new(provider), SearchIndexConfig::new("products"));
        BulkLoader::with_config(client, LoaderConfig { batch_size }, log)
    }

    #[tokio::test]
    async fn test_documents_are_split_into_batches() {
        let provider = MockProvider::default();
        let batches = provider.batches.clone();
        let loader = loader(provider, 2, Arc::new(MemoryRunLog::new()));

        let result = loader.bulk_upsert(documents(5)).await.unwrap();

        assert_eq!(result.succeeded_count, 5);
        assert_eq!(
            *batches.lock().unwrap(),
            vec![vec![1, 2], vec![3, 4], vec![5]]
        );
    }

    #[tokio::test]
    async fn test_partial_failure_is_reported_not_raised() {
        let provider = MockProvider {
            reject_ids: vec![2, 4],
            ..Default::default()
        };
        let log = Arc::new(MemoryRunLog::new());
        let loader = loader(provider, 500, log.clone());

        let result = loader.bulk_upsert(documents(5)).await.unwrap();

        assert_eq!(result.succeeded_count, 3);
        let failed: Vec<&str> = result.failed_items.iter().map(|f| f.document_id.as_str()).collect();
        assert_eq!(failed, vec!["2", "4"]);
        assert_eq!(result.total(), 5);
        assert_eq!(
            log.messages(LogLevel::Warn),
            vec!["Load completed with 2 errors. 3 products indexed successfully.".to_string()]
        );
    }

    #[tokio::test]
    async fn test_transport_failure_aborts_load() {
        let provider = MockProvider {
            fail_on_batch: Some(1),
            ..Default::default()
        };
        let batches = provider.batches.clone();
        let log = Arc::new(MemoryRunLog::new());
        let loader = loader(provider, 2, log.clone());

        let result = loader.bulk_upsert(documents(5)).await;

        assert!(matches!(result, Err(PipelineError::BulkTransportError(_))));
        assert_eq!(batches.lock().unwrap().len(), 1);
        // Reported once by whoever runs the load, not here.
        assert!(log.messages(LogLevel::Error).is_empty());
    }

    #[tokio::test]
    async fn test_empty_input_sends_nothing() {
        let provider = MockProvider::default();
        let batches = provider.batches.clone();
        let loader = loader(provider, 500, Arc::new(MemoryRunLog::new()));

        let result = loader.bulk_upsert(Vec::new()).await.unwrap();

        assert_eq!(result, LoadResult::empty());
        assert!(batches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ensure_index_logs_status() {
        let log = Arc::new(MemoryRunLog::new());
        let created = loader(MockProvider::default(), 500, log.clone());
        assert_eq!(created.ensure_index().await.unwrap(), IndexStatus::Created);

        let existing = loader(
            MockProvider {
                exists: true,
                ..Default::default()
            },
            500,
            log.clone(),
        );
        assert_eq!(existing.ensure_index().await.unwrap(), IndexStatus::Existing);

        assert_eq!(
            log.messages(LogLevel::Info),
            vec![
                "Creating index 'products'".to_string(),
                "Index 'products' already exists".to_string(),
            ]
        );
    }
}
