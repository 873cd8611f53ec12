//! OpenSearch implementation of the search index provider.
//!
//! The same REST surface (index exists/create, `_bulk`, `_search`) is served by
//! Elasticsearch, so this client works against either engine.

mod client;

pub use client::{OpenSearchClient, OpenSearchCredentials};
