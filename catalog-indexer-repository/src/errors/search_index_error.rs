//! Search index error types.
//!
//! This module defines the error types that can occur during search index operations.
//! Individual documents rejected inside a bulk request are not errors; they are
//! reported through `BatchOperationSummary`.

use thiserror::Error;

/// Errors that can occur during search index operations.
#[derive(Debug, Clone, Error)]
pub enum SearchIndexError {
    /// Validation error (e.g., an empty index name).
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Failed to set up or reach the search engine.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Failed to check for or create an index.
    #[error("Index error: {0}")]
    IndexError(String),

    /// The bulk request as a whole failed.
    #[error("Bulk transport error: {0}")]
    BulkTransportError(String),

    /// Search request failed.
    #[error("Query error: {0}")]
    QueryError(String),

    /// Failed to parse a response from the search engine.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Batch size exceeds configured maximum.
    #[error("Batch size {provided} exceeds maximum {max}")]
    BatchSizeExceeded { provided: usize, max: usize },
}

impl SearchIndexError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create an index error.
    pub fn index(msg: impl Into<String>) -> Self {
        Self::IndexError(msg.into())
    }

    /// Create a bulk transport error.
    pub fn bulk_transport(msg: impl Into<String>) -> Self {
        Self::BulkTransportError(msg.into())
    }

    /// Create a query error.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::QueryError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a batch size exceeded error.
    pub fn batch_size_exceeded(provided: usize, max: usize) -> Self {
        Self::BatchSizeExceeded { provided, max }
    }
}
