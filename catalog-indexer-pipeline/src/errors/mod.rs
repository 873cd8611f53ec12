//! Error types for the catalog indexer pipeline.

use catalog_indexer_repository::SearchIndexError;
use thiserror::Error;

/// Errors that abort a pipeline run.
///
/// Documents rejected individually by the search engine are not represented
/// here; they are collected in the run's `LoadResult`.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The relational source could not be reached.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Checking for or creating the projected view failed.
    #[error("Schema error: {0}")]
    SchemaError(String),

    /// The extraction query failed.
    #[error("Query error: {0}")]
    QueryError(String),

    /// A value could not be cast to its declared type.
    #[error("Coercion error in column '{field}': {reason}")]
    CoercionError { field: String, reason: String },

    /// Checking for or creating the target index failed.
    #[error("Index error: {0}")]
    IndexError(String),

    /// The bulk write itself failed, as opposed to individual documents.
    #[error("Bulk transport error: {0}")]
    BulkTransportError(String),
}

impl PipelineError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a schema error.
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::SchemaError(msg.into())
    }

    /// Create a query error.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::QueryError(msg.into())
    }

    /// Create a coercion error.
    pub fn coercion(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CoercionError {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an index error.
    pub fn index(msg: impl Into<String>) -> Self {
        Self::IndexError(msg.into())
    }

    /// Create a bulk transport error.
    pub fn bulk_transport(msg: impl Into<String>) -> Self {
        Self::BulkTransportError(msg.into())
    }
}

impl From<SearchIndexError> for PipelineError {
    fn from(err: SearchIndexError) -> Self {
        match err {
            SearchIndexError::BulkTransportError(msg) => Self::BulkTransportError(msg),
            other => Self::IndexError(other.to_string()),
        }
    }
}

/// Error reported by a relational source, before it is classified by the
/// pipeline step that triggered it.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct SourceError(pub String);

impl SourceError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

impl From<tokio_postgres::Error> for SourceError {
    fn from(err: tokio_postgres::Error) -> Self {
        Self(err.to_string())
    }
}
