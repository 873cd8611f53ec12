//! Orchestrator module for the catalog indexer pipeline.
//!
//! Runs the steps of one sync in order.

use std::sync::Arc;
use tracing::instrument;

use crate::errors::PipelineError;
use crate::loader::BulkLoader;
use crate::logging::RunLog;
use crate::processor::ProductProcessor;
use crate::source::{Extractor, SchemaProjector, SourceConnector};
use catalog_indexer_shared::LoadResult;

/// Orchestrator that coordinates the pipeline components.
///
/// A run:
/// - Opens the source and ensures the projected view
/// - Extracts the view and releases the connection
/// - Normalizes the rows into documents
/// - Ensures the index and bulk-loads the documents
///
/// The index is not touched when there are no rows or when normalization
/// fails.
pub struct Orchestrator<C: SourceConnector> {
    connector: C,
    projector: SchemaProjector,
    extractor: Extractor,
    processor: ProductProcessor,
    loader: BulkLoader,
    log: Arc<dyn RunLog>,
}

impl<C: SourceConnector> Orchestrator<C> {
    /// Create an orchestrator whose components all report to `log`.
    pub fn new(connector: C, loader: BulkLoader, log: Arc<dyn RunLog>) -> Self {
        Self::with_processor(connector, ProductProcessor::new(log.clone()), loader, log)
    }

    /// Create an orchestrator with a custom processor.
    pub fn with_processor(
        connector: C,
        processor: ProductProcessor,
        loader: BulkLoader,
        log: Arc<dyn RunLog>,
    ) -> Self {
        Self {
            connector,
            projector: SchemaProjector::new(log.clone()),
            extractor: Extractor::new(log.clone()),
            processor,
            loader,
            log,
        }
    }

    /// Run one sync from the catalog into the index.
    #[instrument(skip(self), fields(index = %self.loader.index_name()))]
    pub async fn run(&self) -> Result<LoadResult, PipelineError> {
        match self.run_steps().await {
            Ok(result) => Ok(result),
            Err(e) => {
                self.log.error(&format!("Sync failed: {}", e));
                Err(e)
            }
        }
    }

    async fn run_steps(&self) -> Result<LoadResult, PipelineError> {
        let source = self.connector.connect().await?;
        self.projector.ensure_view(&source).await?;
        let table = self.extractor.extract_all(source).await?;

        if table.is_empty() {
            return Ok(LoadResult::empty());
        }

        let documents = self.processor.normalize(table)?;

        self.loader.ensure_index().await?;
        self.log.info(&format!(
            "Loading {} products into index '{}'",
            documents.len(),
            self.loader.index_name()
        ));
        self.loader.bulk_upsert(documents).await
    }
}
