use crate::domains::logger::{DomainLogger, LogLevel};
use std::sync::Arc;
use tokio::sync::mpsc;

struct LogMessage {
    level: LogLevel,
    msg: String,
}

struct BufferedLogger {
    sender: mpsc::Sender<LogMessage>,
}

impl BufferedLogger {
    fn push(&self, level: LogLevel, msg: &str) {
        // Never blocks the editor loop; a full buffer drops the message.
        let _ = self.sender.try_send(LogMessage {
            level,
            msg: msg.to_string(),
        });
    }
}

impl DomainLogger for BufferedLogger {
    fn info(&self, msg: &str) {
        self.push(LogLevel::Info, msg);
    }

    fn warn(&self, msg: &str) {
        self.push(LogLevel::Warn, msg);
    }

    fn error(&self, msg: &str) {
        self.push(LogLevel::Error, msg);
    }
}

/// Non-blocking logger: messages are queued on a channel of `capacity` and
/// forwarded to `bridge` from a background task. Requires a tokio runtime.
pub fn init_buffered_logger(bridge: Arc<dyn DomainLogger>, capacity: usize) -> Arc<dyn DomainLogger> {
    let (tx, mut rx) = mpsc::channel::<LogMessage>(capacity.max(1));

    tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            bridge.log(message.level, &message.msg);
        }
    });

    Arc::new(BufferedLogger { sender: tx })
}
