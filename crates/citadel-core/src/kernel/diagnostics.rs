//! Diagnostic reporting for the kernel.
//!
//! Core logic never writes output directly. Everything that used to be a
//! console message goes through a [`DiagnosticSink`] injected into the
//! [`Application`](crate::kernel::Application), so embedders choose where
//! diagnostics end up and tests can inspect them.
use log::Level;
use parking_lot::Mutex;

/// Receiver for kernel diagnostics.
pub trait DiagnosticSink: Send + Sync {
    /// Record a single diagnostic message.
    fn record(&self, level: Level, target: &str, message: &str);

    fn info(&self, target: &str, message: &str) {
        self.record(Level::Info, target, message);
    }

    fn warn(&self, target: &str, message: &str) {
        self.record(Level::Warn, target, message);
    }

    fn error(&self, target: &str, message: &str) {
        self.record(Level::Error, target, message);
    }
}

/// Forwards diagnostics to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn record(&self, level: Level, target: &str, message: &str) {
        log::log!(target: target, level, "{}", message);
    }
}

/// A diagnostic captured by [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticRecord {
    pub level: Level,
    pub target: String,
    pub message: String,
}

/// Keeps every diagnostic in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<DiagnosticRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all records so far.
    pub fn records(&self) -> Vec<DiagnosticRecord> {
        self.records.lock().clone()
    }

    /// Messages recorded at exactly `level`.
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.records
            .lock()
            .iter()
            .filter(|r| r.level == level)
            .map(|r| r.message.clone())
            .collect()
    }

    /// Whether any record at `level` contains `needle`.
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.records
            .lock()
            .iter()
            .any(|r| r.level == level && r.message.contains(needle))
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl DiagnosticSink for MemorySink {
    fn record(&self, level: Level, target: &str, message: &str) {
        self.records.lock().push(DiagnosticRecord {
            level,
            target: target.to_string(),
            message: message.to_string(),
        });
    }
}
