//! Persistence backend trait: table-scoped CRUD plus a change feed.

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use crate::events::ChangeEvent;
use crate::result::AppResult;
use crate::types::filter::Filters;
use crate::types::table::{Record, Table};

/// Trait for persistence backends.
///
/// Two implementations live in `secretaria-database`: a PostgreSQL client
/// and an in-memory fixture-backed substitute with the same call shape.
/// Which one is used is decided by configuration at process start.
#[async_trait]
pub trait PersistenceBackend: Send + Sync + std::fmt::Debug + 'static {
    /// Return the backend type name (e.g. `"memory"`, `"postgres"`).
    fn backend_type(&self) -> &str;

    /// Insert a record and return it as stored.
    ///
    /// The record must carry a string `id`.
    async fn create(&self, table: Table, record: Record) -> AppResult<Record>;

    /// Read every record matching all filters.
    async fn read(&self, table: Table, filters: &Filters) -> AppResult<Vec<Record>>;

    /// Shallow-merge `partial` into the record with the given id and return
    /// the merged record.
    async fn update(&self, table: Table, id: &str, partial: Record) -> AppResult<Record>;

    /// Delete the record with the given id. Returns `true` if a row was removed.
    async fn delete(&self, table: Table, id: &str) -> AppResult<bool>;

    /// Subscribe to changes on a table.
    async fn subscribe(&self, table: Table) -> AppResult<ChangeSubscription>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}

/// A live subscription to a table's change feed.
///
/// Dropping the subscription (or calling [`unsubscribe`](Self::unsubscribe))
/// ends it.
#[derive(Debug)]
pub struct ChangeSubscription {
    table: Table,
    rx: broadcast::Receiver<ChangeEvent>,
}

impl ChangeSubscription {
    /// Wrap a broadcast receiver.
    pub fn new(table: Table, rx: broadcast::Receiver<ChangeEvent>) -> Self {
        Self { table, rx }
    }

    /// The subscribed table.
    pub fn table(&self) -> Table {
        self.table
    }

    /// Wait for the next event. Returns `None` once the feed is closed.
    ///
    /// Events dropped because the subscriber fell behind are skipped with a
    /// warning.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(table = %self.table, skipped, "Change subscriber lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// End the subscription.
    pub fn unsubscribe(self) {}
}
