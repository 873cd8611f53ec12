//! Result types for bulk search index operations.

use catalog_indexer_shared::{FailedItem, LoadResult};

/// Result of a batch operation for a single document.
///
/// Indicates whether the document was written and includes the engine's
/// reason if it was not.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOperationResult {
    /// The document's `_id`.
    pub document_id: String,
    /// Whether the operation succeeded.
    pub success: bool,
    /// Item status reported by the engine.
    pub status: Option<u16>,
    /// Failure reason if the operation failed.
    pub error: Option<String>,
}

impl BatchOperationResult {
    /// A successfully written document.
    pub fn succeeded(document_id: impl Into<String>, status: Option<u16>) -> Self {
        Self {
            document_id: document_id.into(),
            success: true,
            status,
            error: None,
        }
    }

    /// A document the engine refused.
    pub fn failed(
        document_id: impl Into<String>,
        status: Option<u16>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            success: false,
            status,
            error: Some(error.into()),
        }
    }
}

/// Summary of a batch operation containing aggregate statistics and individual results.
///
/// This allows callers to handle partial failures gracefully.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOperationSummary {
    /// Total number of documents in the batch.
    pub total: usize,
    /// Number of successful operations.
    pub succeeded: usize,
    /// Number of failed operations.
    pub failed: usize,
    /// Individual results for each document, in request order.
    pub results: Vec<BatchOperationResult>,
}

impl BatchOperationSummary {
    /// Build a summary from per-document results.
    pub fn from_results(results: Vec<BatchOperationResult>) -> Self {
        let succeeded = results.iter().filter(|r| r.success).count();
        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            results,
        }
    }
}

impl From<BatchOperationSummary> for LoadResult {
    fn from(summary: BatchOperationSummary) -> Self {
        let failed_items = summary
            .results
            .into_iter()
            .filter(|r| !r.success)
            .map(|r| FailedItem {
                document_id: r.document_id,
                status: r.status,
                reason: r.error.unwrap_or_else(|| "unknown error".to_string()),
            })
            .collect();

        LoadResult {
            succeeded_count: summary.succeeded,
            failed_items,
        }
    }
}
