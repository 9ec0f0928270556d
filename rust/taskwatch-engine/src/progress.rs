//! Progress reporting for compliance runs.
//!
//! The orchestrator emits one human-readable line per notable step through a
//! caller-supplied [`ProgressSink`]. The sink is an append-only observation
//! channel, never a control mechanism.

use parking_lot::Mutex;

/// Append-only sink for run progress messages.
pub trait ProgressSink: Send + Sync {
    /// Record one progress line.
    fn notify(&self, message: &str);
}

/// Production sink that forwards progress lines to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn notify(&self, message: &str) {
        tracing::info!(component = "engine", "{message}");
    }
}

/// In-memory sink that collects messages, for tests and for returning the
/// run log from the HTTP trigger.
#[derive(Debug, Default)]
pub struct MemorySink {
    messages: Mutex<Vec<String>>,
}

impl MemorySink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all messages received so far.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }
}

impl ProgressSink for MemorySink {
    fn notify(&self, message: &str) {
        self.messages.lock().push(message.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_collects_in_order() {
        let sink = MemorySink::new();
        sink.notify("first");
        sink.notify("second");
        assert_eq!(sink.messages(), vec!["first", "second"]);
    }
}
