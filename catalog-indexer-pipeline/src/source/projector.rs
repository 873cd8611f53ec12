//! Projected view over the catalog schema.
//!
//! The view is the pipeline's only read contract with the source tables: it
//! selects the indexed columns under their document field names and applies
//! the fixed filter `name IS NOT NULL AND list_price <> 0 AND weight IS NOT NULL`.
//!
//! The existence check and the DDL are two separate statements. Two runs
//! started at the same time against the same database may both see the view
//! as missing; `CREATE OR REPLACE` makes the second creation harmless.

use std::sync::Arc;

use super::RelationalSource;
use crate::errors::PipelineError;
use crate::logging::RunLog;

/// Name of the projected view.
pub const VIEW_NAME: &str = "vw_indexed_products";

/// DDL defining the projected view.
pub const VIEW_DEFINITION_SQL: &str = r#"
CREATE OR REPLACE VIEW vw_indexed_products AS
SELECT
    pr.productid AS product_id,
    pr.name AS name,
    pr.productnumber AS product_number,
    pr.color AS color,
    pr.listprice AS list_price,
    pr.size AS size,
    pr.weight AS weight,
    pr.safetystocklevel AS stock_level,
    pr.productmodelid AS product_model_id
FROM production.product AS pr
LEFT JOIN production.productmodel AS pm ON pr.productmodelid = pm.productmodelid
WHERE pr.name IS NOT NULL
    AND pr.listprice <> 0
    AND pr.weight IS NOT NULL
"#;

/// Ensures the projected view exists before extraction.
pub struct SchemaProjector {
    log: Arc<dyn RunLog>,
}

impl SchemaProjector {
    pub fn new(log: Arc<dyn RunLog>) -> Self {
        Self { log }
    }

    /// Create the view if the catalog does not list it; otherwise do nothing.
    ///
    /// Calling this any number of times leaves the same definition in place.
    pub async fn ensure_view<S>(&self, source: &S) -> Result<(), PipelineError>
    where
        S: RelationalSource + ?Sized,
    {
        let existing = source
            .view_definition(VIEW_NAME)
            .await
            .map_err(|e| PipelineError::schema(format!("Failed to look up view {}: {}", VIEW_NAME, e)))?;

        if existing.is_some() {
            self.log.info(&format!("View {} already exists", VIEW_NAME));
            return Ok(());
        }

        self.log.info(&format!("Creating view {}", VIEW_NAME));
        source
            .execute(VIEW_DEFINITION_SQL)
            .await
            .map_err(|e| PipelineError::schema(format!("Failed to create view {}: {}", VIEW_NAME, e)))
    }
}
