//! Notification sinks.

use std::sync::Mutex;

use tracing::{info, warn};

use secretaria_core::traits::notification::{Notification, NotificationLevel, NotificationSink};

/// Emits notifications as log lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => info!(message = %notification.message, "Notification"),
            NotificationLevel::Error => warn!(message = %notification.message, "Notification"),
        }
    }
}

/// Collects notifications in memory so they can be displayed or inspected.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<Notification>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every notification received so far.
    pub fn notifications(&self) -> Vec<Notification> {
        self.lock().clone()
    }

    /// The most recent notification.
    pub fn last(&self) -> Option<Notification> {
        self.lock().last().cloned()
    }

    /// Remove and return every notification received so far.
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Notification>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl NotificationSink for MemorySink {
    fn notify(&self, notification: Notification) {
        self.lock().push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_take_drains() {
        let sink = MemorySink::new();
        sink.notify(Notification::success("ok"));
        sink.notify(Notification::error("fallo"));
        assert_eq!(sink.last().unwrap().level, NotificationLevel::Error);
        assert_eq!(sink.take().len(), 2);
        assert!(sink.notifications().is_empty());
    }
}
