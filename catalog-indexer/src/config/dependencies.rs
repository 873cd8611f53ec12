//! Dependency initialization and wiring for the catalog indexer.

use std::sync::Arc;
use tracing::info;

use super::settings::{SearchSettings, Settings};
use crate::IndexingError;
use catalog_indexer_pipeline::{
    loader::{BulkLoader, LoaderConfig},
    orchestrator::Orchestrator,
    source::PostgresConnector,
    RunLog, TracingRunLog,
};
use catalog_indexer_repository::{OpenSearchClient, SearchIndexClient, SearchIndexConfig};

/// Container for all initialized dependencies of a sync run.
pub struct Dependencies {
    /// The configured orchestrator ready to run.
    pub orchestrator: Orchestrator<PostgresConnector>,
    /// Log shared by every component of the run.
    pub log: Arc<TracingRunLog>,
}

impl Dependencies {
    /// Wire a sync run from its settings.
    ///
    /// Nothing is contacted here: the database connection is opened by the
    /// run itself and the search client connects lazily.
    pub async fn new(settings: Settings) -> Result<Self, IndexingError> {
        let log = Arc::new(TracingRunLog::new());

        info!(
            run_id = %log.run_id(),
            pg_host = %settings.postgres.host,
            pg_database = %settings.postgres.database,
            es_host = %settings.search.host,
            index = %settings.search.index_name,
            batch_size = settings.search.bulk_batch_size,
            "Initializing dependencies"
        );

        let batch_size = settings.search.bulk_batch_size;
        let client = search_client(&settings.search).await?;

        let run_log: Arc<dyn RunLog> = log.clone();
        let loader = BulkLoader::with_config(client, LoaderConfig { batch_size }, run_log.clone());
        let connector = PostgresConnector::new(settings.postgres);
        let orchestrator = Orchestrator::new(connector, loader, run_log);

        Ok(Self { orchestrator, log })
    }
}

/// Build a search index client for the configured engine and index.
///
/// The bulk request limit follows the configured chunk size.
pub async fn search_client(settings: &SearchSettings) -> Result<SearchIndexClient, IndexingError> {
    let provider = OpenSearchClient::new(&settings.host, settings.credentials.clone())
        .await
        .map_err(|e| IndexingError::config(format!("Failed to create search client: {}", e)))?;

    let config = SearchIndexConfig::new(settings.index_name.clone())
        .with_max_batch_size(settings.bulk_batch_size);

    Ok(SearchIndexClient::with_config(Box::new(provider), config))
}
