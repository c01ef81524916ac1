//! Per-table broadcast of change events.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tokio::sync::broadcast;
use tracing::trace;

use secretaria_core::events::ChangeEvent;
use secretaria_core::traits::persistence::ChangeSubscription;
use secretaria_core::types::Table;

/// Fans change events out to every subscriber of a table.
///
/// Channels are created on first subscription; events published to a table
/// nobody listens on are dropped.
#[derive(Debug)]
pub struct ChangeHub {
    channels: RwLock<HashMap<Table, broadcast::Sender<ChangeEvent>>>,
    buffer_size: usize,
}

impl ChangeHub {
    /// Create a hub whose channels buffer `buffer_size` events each.
    pub fn new(buffer_size: usize) -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            buffer_size: buffer_size.max(1),
        }
    }

    /// Publish an event to its table's subscribers. Returns how many
    /// subscribers received it.
    pub async fn publish(&self, event: ChangeEvent) -> usize {
        let channels = self.channels.read().await;
        let Some(tx) = channels.get(&event.table) else {
            return 0;
        };
        trace!(
            table = %event.table,
            kind = %event.event_type,
            subscribers = tx.receiver_count(),
            "Publishing change"
        );
        tx.send(event).unwrap_or(0)
    }

    /// Subscribe to a table.
    pub async fn subscribe(&self, table: Table) -> ChangeSubscription {
        let mut channels = self.channels.write().await;
        let tx = channels
            .entry(table)
            .or_insert_with(|| broadcast::channel(self.buffer_size).0);
        ChangeSubscription::new(table, tx.subscribe())
    }
}
