//! Run-scoped logging port.
//!
//! Pipeline components report progress through a `RunLog` handed to them at
//! construction instead of a process-wide logger. One log instance lives for
//! exactly one run.

use std::sync::Mutex;

use tracing::{error, info, info_span, warn, Span};
use uuid::Uuid;

/// Severity of a run log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// Logging capability injected into each pipeline component.
pub trait RunLog: Send + Sync {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

/// `RunLog` that emits `tracing` events inside a span tagged with the run id.
pub struct TracingRunLog {
    run_id: Uuid,
    span: Span,
}

impl TracingRunLog {
    /// Start the log for a new run.
    pub fn new() -> Self {
        Self::with_run_id(Uuid::new_v4())
    }

    pub fn with_run_id(run_id: Uuid) -> Self {
        let span = info_span!("catalog_sync", run_id = %run_id);
        Self { run_id, span }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }
}

impl Default for TracingRunLog {
    fn default() -> Self {
        Self::new()
    }
}

impl RunLog for TracingRunLog {
    fn info(&self, message: &str) {
        self.span.in_scope(|| info!("{}", message));
    }

    fn warn(&self, message: &str) {
        self.span.in_scope(|| warn!("{}", message));
    }

    fn error(&self, message: &str) {
        self.span.in_scope(|| error!("{}", message));
    }
}

/// `RunLog` that keeps entries in memory, for inspecting what a run reported.
#[derive(Default)]
pub struct MemoryRunLog {
    entries: Mutex<Vec<(LogLevel, String)>>,
}

impl MemoryRunLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries in the order they were logged.
    pub fn entries(&self) -> Vec<(LogLevel, String)> {
        self.lock().clone()
    }

    /// Messages logged at the given level.
    pub fn messages(&self, level: LogLevel) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    fn push(&self, level: LogLevel, message: &str) {
        self.lock().push((level, message.to_string()));
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(LogLevel, String)>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl RunLog for MemoryRunLog {
    fn info(&self, message: &str) {
        self.push(LogLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.push(LogLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.push(LogLevel::Error, message);
    }
}
