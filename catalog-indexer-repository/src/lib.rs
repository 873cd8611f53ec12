//! # Catalog Indexer Repository
//!
//! This crate provides traits and implementations for interacting with the
//! search engine. It includes definitions for errors, interfaces, and a
//! concrete implementation speaking the OpenSearch/Elasticsearch REST protocol.

pub mod client;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod types;

pub use client::{IndexStatus, SearchIndexClient};
pub use config::SearchIndexConfig;
pub use errors::SearchIndexError;
pub use interfaces::SearchIndexProvider;
pub use opensearch::{OpenSearchClient, OpenSearchCredentials};
pub use types::{BatchOperationResult, BatchOperationSummary};
