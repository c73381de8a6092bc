use crate::domains::logger::DomainLogger;
use std::sync::Arc;

/// Fans every message out to each attached logger, in order.
pub struct MultiLogger {
    sinks: Vec<Arc<dyn DomainLogger>>,
}

impl MultiLogger {
    pub fn new(sinks: Vec<Arc<dyn DomainLogger>>) -> Self {
        Self { sinks }
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl DomainLogger for MultiLogger {
    fn info(&self, msg: &str) {
        self.sinks.iter().for_each(|sink| sink.info(msg));
    }

    fn warn(&self, msg: &str) {
        self.sinks.iter().for_each(|sink| sink.warn(msg));
    }

    fn error(&self, msg: &str) {
        self.sinks.iter().for_each(|sink| sink.error(msg));
    }
}

/// Console logging plus, when `file_path` is set and `fast_log` starts, the editor log file.
/// Falls back to console only if the file logger cannot be initialised.
pub fn init_combined_logger(file_path: Option<&str>, level: crate::domains::logger::LogLevel) -> Arc<dyn DomainLogger> {
    let console = super::init_console_logger();
    let Some(path) = file_path else {
        return console;
    };
    match super::init_file_logger(path, level) {
        Ok(file) => Arc::new(MultiLogger::new(vec![console, file])),
        Err(e) => {
            console.warn(&e);
            console
        }
    }
}
