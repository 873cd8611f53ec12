//! Configuration types for the SearchIndexClient.

/// Name of the index products are written to when none is configured.
pub const DEFAULT_INDEX_NAME: &str = "products";

/// Configuration for the SearchIndexClient.
#[derive(Debug, Clone)]
pub struct SearchIndexConfig {
    /// Index every document of a run is written to.
    pub index_name: String,
    /// Maximum number of documents allowed in a single bulk request.
    /// Set to None to disable the limit (not recommended for production).
    pub max_batch_size: Option<usize>,
}

impl Default for SearchIndexConfig {
    fn default() -> Self {
        Self::new(DEFAULT_INDEX_NAME)
    }
}

impl SearchIndexConfig {
    /// Create a config targeting the given index with the default batch limit.
    pub fn new(index_name: impl Into<String>) -> Self {
        Self {
            index_name: index_name.into(),
            max_batch_size: Some(1000),
        }
    }

    /// Remove the batch size limit (use with caution).
    pub fn unlimited(mut self) -> Self {
        self.max_batch_size = None;
        self
    }

    /// Use a custom batch size limit.
    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = Some(max_batch_size);
        self
    }
}
