use crate::domains::logger::{DomainLogger, LogLevel};
use std::sync::{Arc, Mutex};

/// Keeps every message in memory. Handy for asserting on editor warnings.
#[derive(Default)]
pub struct MemoryLogger {
    entries: Mutex<Vec<(LogLevel, String)>>,
}

impl MemoryLogger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn entries(&self) -> Vec<(LogLevel, String)> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn messages_at(&self, level: LogLevel) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, msg)| msg)
            .collect()
    }

    fn record(&self, level: LogLevel, msg: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push((level, msg.to_string()));
        }
    }
}

impl DomainLogger for MemoryLogger {
    fn info(&self, msg: &str) {
        self.record(LogLevel::Info, msg);
    }

    fn warn(&self, msg: &str) {
        self.record(LogLevel::Warn, msg);
    }

    fn error(&self, msg: &str) {
        self.record(LogLevel::Error, msg);
    }
}
