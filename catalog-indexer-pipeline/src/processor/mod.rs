//! Processor module for the catalog indexer pipeline.
//!
//! Turns the extracted table into typed search documents.

mod coercion;
mod product_processor;

pub use coercion::{CoercionRule, CoercionRules, NullPolicy, TargetKind};
pub use product_processor::{ProductDocuments, ProductProcessor};
