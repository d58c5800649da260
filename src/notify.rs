//! Progress notification sink.
//!
//! The gateway reports human-readable progress ("retrying in 4s", terminal
//! errors) through an injected sink instead of touching any display mechanism
//! directly. Callers plug in whatever rendering they own; the default is a
//! no-op.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Destination for gateway progress and error messages.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, message: &str, is_error: bool);
}

/// Discards all notifications (the default).
#[derive(Debug, Default)]
pub struct NoopSink;

#[async_trait]
impl NotificationSink for NoopSink {
    async fn notify(&self, _message: &str, _is_error: bool) {}
}

/// Forwards notifications to `tracing` at info/error level.
#[derive(Debug, Default)]
pub struct TracingSink;

#[async_trait]
impl NotificationSink for TracingSink {
    async fn notify(&self, message: &str, is_error: bool) {
        if is_error {
            tracing::error!(target: "classify_gateway", "{message}");
        } else {
            tracing::info!(target: "classify_gateway", "{message}");
        }
    }
}

/// Records notifications in memory, for tests and batch summaries.
#[derive(Debug, Default)]
pub struct MemorySink {
    messages: Mutex<Vec<(String, bool)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<(String, bool)> {
        self.messages.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn clear(&self) {
        self.messages.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

#[async_trait]
impl NotificationSink for MemorySink {
    async fn notify(&self, message: &str, is_error: bool) {
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((message.to_string(), is_error));
    }
}

/// Convenience constructor for the default sink.
pub fn noop_sink() -> Arc<dyn NotificationSink> {
    Arc::new(NoopSink)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_sink_records_in_order() {
        let sink = MemorySink::new();
        sink.notify("first", false).await;
        sink.notify("second", true).await;
        let messages = sink.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], ("first".to_string(), false));
        assert!(messages[1].1);
    }
}
