//! Full-scan extraction over the projected view.

use std::sync::Arc;

use super::table::Table;
use super::RelationalSource;
use crate::errors::PipelineError;
use crate::logging::RunLog;

/// Query run against the view. The view already embodies the filter.
pub const EXTRACT_QUERY: &str = "SELECT * FROM vw_indexed_products";

/// Reads every row of the projected view into memory.
pub struct Extractor {
    log: Arc<dyn RunLog>,
}

impl Extractor {
    pub fn new(log: Arc<dyn RunLog>) -> Self {
        Self { log }
    }

    /// Materialize the view and release the connection.
    ///
    /// The source is taken by value and dropped as soon as the rows are in
    /// memory. An empty table is a valid result.
    pub async fn extract_all<S>(&self, source: S) -> Result<Table, PipelineError>
    where
        S: RelationalSource,
    {
        self.log.info("Extracting product data from PostgreSQL");

        let table = source
            .fetch_table(EXTRACT_QUERY)
            .await
            .map_err(|e| PipelineError::query(format!("Extraction query failed: {}", e)))?;
        drop(source);

        if table.is_empty() {
            self.log.warn("No product data found in the database");
        } else {
            self.log.info(&format!("Extracted {} product rows", table.len()));
        }
        Ok(table)
    }
}
