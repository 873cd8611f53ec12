//! Outcome of loading documents into the search index.

use serde::Serialize;

/// A single document the search engine refused to write.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedItem {
    /// Identity of the offending document.
    pub document_id: String,
    /// HTTP status reported for the item, when the engine returned one.
    pub status: Option<u16>,
    /// Underlying cause as reported by the engine.
    pub reason: String,
}

/// Aggregate result of one pipeline run.
///
/// A non-empty `failed_items` is a partial success, not an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadResult {
    /// Number of documents written successfully.
    pub succeeded_count: usize,
    /// Per-document failures, in the order the engine reported them.
    pub failed_items: Vec<FailedItem>,
}

impl LoadResult {
    /// Result of a run that had nothing to load.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Total number of documents attempted.
    pub fn total(&self) -> usize {
        self.succeeded_count + self.failed_items.len()
    }

    /// True when at least one document failed.
    pub fn has_failures(&self) -> bool {
        !self.failed_items.is_empty()
    }

    /// Fold another result (e.g. from a later chunk) into this one.
    pub fn merge(&mut self, other: LoadResult) {
        self.succeeded_count += other.succeeded_count;
        self.failed_items.extend(other.failed_items);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(id: &str) -> FailedItem {
        FailedItem {
            document_id: id.to_string(),
            status: Some(400),
            reason: "mapper_parsing_exception".to_string(),
        }
    }

    #[test]
    fn test_empty_result() {
        let result = LoadResult::empty();
        assert_eq!(result.succeeded_count, 0);
        assert_eq!(result.total(), 0);
        assert!(!result.has_failures());
    }

    #[test]
    fn test_merge_preserves_failure_order() {
        let mut result = LoadResult {
            succeeded_count: 2,
            failed_items: vec![failure("3")],
        };
        result.merge(LoadResult {
            succeeded_count: 1,
            failed_items: vec![failure("5"), failure("6")],
        });

        assert_eq!(result.succeeded_count, 3);
        assert_eq!(result.total(), 6);
        let ids: Vec<&str> = result
            .failed_items
            .iter()
            .map(|f| f.document_id.as_str())
            .collect();
        assert_eq!(ids, vec!["3", "5", "6"]);
    }
}
