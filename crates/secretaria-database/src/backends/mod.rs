//! Persistence backend implementations and the startup factory.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use tracing::info;

use secretaria_core::config::{AppConfig, BackendKind};
use secretaria_core::error::AppError;
use secretaria_core::result::AppResult;
use secretaria_core::traits::persistence::PersistenceBackend;
use secretaria_core::types::Record;

pub use memory::{Fixtures, MemoryBackend};
pub use postgres::PostgresBackend;

/// Instantiate the backend selected by configuration.
pub async fn connect_backend(config: &AppConfig) -> AppResult<Arc<dyn PersistenceBackend>> {
    let buffer = config.realtime.channel_buffer;
    let backend: Arc<dyn PersistenceBackend> = match config.backend.kind {
        BackendKind::Memory => {
            let backend = match config.backend.fixtures.as_deref() {
                Some(path) => MemoryBackend::from_fixture_file(path, buffer).await?,
                None => MemoryBackend::new(buffer),
            };
            Arc::new(backend)
        }
        BackendKind::Postgres => {
            Arc::new(PostgresBackend::connect(&config.database, buffer).await?)
        }
    };
    info!(backend = backend.backend_type(), "Persistence backend ready");
    Ok(backend)
}

/// Extract the mandatory string `id` of a record.
pub(crate) fn record_id(record: &Record) -> AppResult<String> {
    record
        .get("id")
        .and_then(|v| v.as_str())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::validation("Record is missing a string 'id'"))
}
