//! # Catalog Indexer Pipeline
//!
//! This crate provides the pipeline components that copy the product catalog
//! from PostgreSQL into a search index.
//!
//! ## Architecture
//!
//! A run is a single pass through five steps:
//!
//! 1. **Connection**: Opens the relational source
//! 2. **Schema projection**: Ensures the projected view exists
//! 3. **Extraction**: Reads the whole view into memory
//! 4. **Processing**: Coerces each field and builds documents
//! 5. **Loading**: Ensures the index and bulk-writes the documents
//!
//! The **Orchestrator** runs the steps in order and stops at the first fatal error.

pub mod errors;
pub mod loader;
pub mod logging;
pub mod orchestrator;
pub mod processor;
pub mod source;

pub use errors::{PipelineError, SourceError};
pub use loader::{BulkLoader, LoaderConfig};
pub use logging::{LogLevel, MemoryRunLog, RunLog, TracingRunLog};
pub use orchestrator::Orchestrator;
pub use processor::ProductProcessor;
