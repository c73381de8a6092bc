use crate::domains::logger::DomainLogger;
use std::sync::Arc;

/// Forwards domain messages to `tracing`, so they share the subscriber set up in `main`.
struct TracingBridge;

impl DomainLogger for TracingBridge {
    fn info(&self, msg: &str) {
        tracing::info!(target: "greenhouse_planner::editor", "{}", msg);
    }

    fn warn(&self, msg: &str) {
        tracing::warn!(target: "greenhouse_planner::editor", "{}", msg);
    }

    fn error(&self, msg: &str) {
        tracing::error!(target: "greenhouse_planner::editor", "{}", msg);
    }
}

/// Console logger backed by the global tracing subscriber.
pub fn init_console_logger() -> Arc<dyn DomainLogger> {
    Arc::new(TracingBridge)
}
