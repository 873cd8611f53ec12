//! Configuration and dependency wiring.

mod dependencies;
mod settings;

pub use dependencies::{search_client, Dependencies};
pub use settings::{SearchSettings, Settings};
