//! Background task feeding backend change events into a store.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use secretaria_core::result::AppResult;
use secretaria_core::types::Table;

use super::service::DocumentStore;

/// Handle to a running change-feed task. The task is aborted on drop.
#[derive(Debug)]
pub struct StoreWatcher {
    handle: JoinHandle<()>,
}

impl StoreWatcher {
    /// Stop applying changes.
    pub fn stop(self) {}

    /// Whether the task has ended (its subscriptions closed).
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for StoreWatcher {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl DocumentStore {
    /// Subscribe to folder and document changes and apply them to the
    /// working set until the returned watcher is dropped.
    ///
    /// Both subscriptions are open when this returns.
    pub async fn watch(self: &Arc<Self>) -> AppResult<StoreWatcher> {
        let mut folders = self.backend().subscribe(Table::Carpetas).await?;
        let mut documents = self.backend().subscribe(Table::Documentos).await?;
        let store = Arc::clone(self);

        let handle = tokio::spawn(async move {
            info!(scope = %store.scope(), "Watching changes");
            let (folder_table, document_table) = (folders.table(), documents.table());
            let closed = loop {
                // Folder events first, so a document never arrives before its folder.
                let (table, event) = tokio::select! {
                    biased;
                    event = folders.recv() => (folder_table, event),
                    event = documents.recv() => (document_table, event),
                };
                let Some(event) = event else {
                    break table;
                };
                match store.apply_change(&event).await {
                    Ok(changed) => {
                        debug!(
                            table = %event.table,
                            kind = %event.event_type,
                            changed,
                            "Change applied"
                        );
                    }
                    Err(e) => {
                        warn!(table = %event.table, error = %e, "Ignoring malformed change event");
                    }
                }
            };
            info!(scope = %store.scope(), table = %closed, "Change feed closed");
        });

        Ok(StoreWatcher { handle })
    }
}
