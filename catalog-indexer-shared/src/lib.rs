//! # Catalog Indexer Shared
//!
//! Types shared between the pipeline and the search index repository.

pub mod document;
pub mod load_result;

pub use document::{fields, ProductDocument};
pub use load_result::{FailedItem, LoadResult};
