use crate::domains::logger::{DomainLogger, FileLogger, LogLevel};
use std::sync::Arc;

/// Initialise `fast_log` on `path` and return the logger to inject into the editor.
pub fn init_file_logger(path: &str, level: LogLevel) -> Result<Arc<dyn DomainLogger>, String> {
    FileLogger::init(path, level).map_err(|e| format!("Failed to initialize fast_log at {}: {}", path, e))?;
    Ok(Arc::new(FileLogger))
}
