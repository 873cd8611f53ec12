//! Source module for the catalog indexer pipeline.
//!
//! Reads product rows from the relational catalog through a projected view.

mod extractor;
mod postgres;
mod projector;
mod table;

pub use extractor::{Extractor, EXTRACT_QUERY};
pub use postgres::{acquire_connection, PostgresConfig, PostgresConnector, PostgresSource};
pub use projector::{SchemaProjector, VIEW_DEFINITION_SQL, VIEW_NAME};
pub use table::{Cell, Column, ColumnKind, Table};

use async_trait::async_trait;

use crate::errors::{PipelineError, SourceError};

/// The statements the pipeline issues against the relational source.
#[async_trait]
pub trait RelationalSource: Send + Sync {
    /// Look up a view in the catalog metadata and return its stored
    /// definition, or `None` if no view of that name exists.
    async fn view_definition(&self, view_name: &str) -> Result<Option<String>, SourceError>;

    /// Execute a statement that returns no rows (DDL), committing it.
    async fn execute(&self, statement: &str) -> Result<(), SourceError>;

    /// Run a query and materialize its full result.
    async fn fetch_table(&self, query: &str) -> Result<Table, SourceError>;
}

/// Opens a connection to the relational source at the start of a run.
#[async_trait]
pub trait SourceConnector: Send + Sync {
    type Source: RelationalSource;

    async fn connect(&self) -> Result<Self::Source, PipelineError>;
}
