//! PostgreSQL persistence backend.
//!
//! Every table has the shape `(id TEXT PRIMARY KEY, data JSONB, created_at,
//! updated_at)`; the record itself lives in `data`. Filters compile to
//! `data->>'column'` comparisons. A trigger installed by the migrations
//! calls `pg_notify` on every write and a background [`PgListener`] feeds
//! those notifications into the backend's [`ChangeHub`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgListener, PgPool, Postgres};
use sqlx::QueryBuilder;
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use secretaria_core::config::DatabaseConfig;
use secretaria_core::error::{AppError, ErrorKind};
use secretaria_core::events::ChangeEvent;
use secretaria_core::result::AppResult;
use secretaria_core::traits::persistence::{ChangeSubscription, PersistenceBackend};
use secretaria_core::types::{FilterValue, Filters, Record, Table};

use super::record_id;
use crate::connection::DatabasePool;
use crate::hub::ChangeHub;
use crate::migration::run_migrations;

/// Notification channel the change trigger publishes on.
pub const CHANGE_CHANNEL: &str = "secretaria_changes";

/// PostgreSQL-backed implementation of [`PersistenceBackend`].
#[derive(Debug)]
pub struct PostgresBackend {
    pool: PgPool,
    hub: Arc<ChangeHub>,
    listener: OnceCell<JoinHandle<()>>,
}

impl PostgresBackend {
    /// Connect using the database configuration, running migrations first
    /// when `run_migrations` is set.
    pub async fn connect(config: &DatabaseConfig, channel_buffer: usize) -> AppResult<Self> {
        let pool = DatabasePool::connect(config).await?.into_pool();
        if config.run_migrations {
            run_migrations(&pool).await?;
        }
        Ok(Self::from_pool(pool, channel_buffer))
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: PgPool, channel_buffer: usize) -> Self {
        Self {
            pool,
            hub: Arc::new(ChangeHub::new(channel_buffer)),
            listener: OnceCell::new(),
        }
    }

    /// Start the LISTEN task once, on first subscription.
    async fn ensure_listener(&self) -> AppResult<()> {
        self.listener
            .get_or_try_init(|| async {
                let mut listener = PgListener::connect_with(&self.pool)
                    .await
                    .map_err(|e| db_error("Failed to open change listener", e))?;
                listener
                    .listen(CHANGE_CHANNEL)
                    .await
                    .map_err(|e| db_error("Failed to LISTEN for changes", e))?;
                info!(channel = CHANGE_CHANNEL, "Listening for row changes");
                Ok::<_, AppError>(tokio::spawn(forward_notifications(
                    listener,
                    Arc::clone(&self.hub),
                )))
            })
            .await?;
        Ok(())
    }
}

impl Drop for PostgresBackend {
    fn drop(&mut self) {
        if let Some(handle) = self.listener.get() {
            handle.abort();
        }
    }
}

/// Forward NOTIFY payloads into the hub until the task is aborted.
///
/// `PgListener` reconnects on the next `recv` after a connection error.
async fn forward_notifications(mut listener: PgListener, hub: Arc<ChangeHub>) {
    loop {
        match listener.recv().await {
            Ok(notification) => {
                match serde_json::from_str::<ChangeEvent>(notification.payload()) {
                    Ok(event) => {
                        hub.publish(event).await;
                    }
                    Err(e) => warn!(error = %e, "Discarding malformed change notification"),
                }
            }
            Err(e) => {
                warn!(error = %e, "Change listener error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }
    }
}

fn db_error(message: &str, err: sqlx::Error) -> AppError {
    AppError::with_source(ErrorKind::Database, format!("{message}: {err}"), err)
}

fn into_record(value: serde_json::Value) -> AppResult<Record> {
    match value {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(AppError::database(format!(
            "Expected a JSON object row, got {other}"
        ))),
    }
}

/// Build the SELECT for a filtered read.
fn select_query(table: Table, filters: &Filters) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT data FROM {} WHERE TRUE", table.as_str()));
    for filter in filters.iter() {
        qb.push(" AND data->>").push_bind(filter.field.clone());
        match &filter.value {
            FilterValue::String(value) => {
                qb.push(" = ").push_bind(value.clone());
            }
            FilterValue::StringList(values) => {
                qb.push(" = ANY(").push_bind(values.clone()).push(")");
            }
        }
    }
    qb.push(" ORDER BY created_at ASC, id ASC");
    qb
}

#[async_trait]
impl PersistenceBackend for PostgresBackend {
    fn backend_type(&self) -> &str {
        "postgres"
    }

    async fn create(&self, table: Table, record: Record) -> AppResult<Record> {
        let id = record_id(&record)?;
        let sql = format!(
            "INSERT INTO {} (id, data) VALUES ($1, $2) RETURNING data",
            table.as_str()
        );
        let data = sqlx::query_scalar::<_, serde_json::Value>(&sql)
            .bind(&id)
            .bind(serde_json::Value::Object(record))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                    AppError::conflict(format!("Row '{id}' already exists in {table}"))
                }
                _ => db_error("Failed to insert row", e),
            })?;
        debug!(%table, id, "Inserted row");
        into_record(data)
    }

    async fn read(&self, table: Table, filters: &Filters) -> AppResult<Vec<Record>> {
        let mut qb = select_query(table, filters);
        let rows = qb
            .build_query_scalar::<serde_json::Value>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to read rows", e))?;
        rows.into_iter().map(into_record).collect()
    }

    async fn update(&self, table: Table, id: &str, mut partial: Record) -> AppResult<Record> {
        partial.remove("id");
        let sql = format!(
            "UPDATE {} SET data = data || $2, updated_at = NOW() WHERE id = $1 RETURNING data",
            table.as_str()
        );
        let data = sqlx::query_scalar::<_, serde_json::Value>(&sql)
            .bind(id)
            .bind(serde_json::Value::Object(partial))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to update row", e))?
            .ok_or_else(|| AppError::not_found(format!("Row '{id}' not found in {table}")))?;
        debug!(%table, id, "Updated row");
        into_record(data)
    }

    async fn delete(&self, table: Table, id: &str) -> AppResult<bool> {
        let sql = format!("DELETE FROM {} WHERE id = $1", table.as_str());
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to delete row", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn subscribe(&self, table: Table) -> AppResult<ChangeSubscription> {
        self.ensure_listener().await?;
        Ok(self.hub.subscribe(table).await)
    }

    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| db_error("Health check failed", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_query_shape() {
        let filters = Filters::new()
            .where_eq("areaId", "a1")
            .where_in("folderId", ["f1", "f2"]);
        let qb = select_query(Table::Documentos, &filters);
        assert_eq!(
            qb.sql(),
            "SELECT data FROM documentos WHERE TRUE AND data->>$1 = $2 \
             AND data->>$3 = ANY($4) ORDER BY created_at ASC, id ASC"
        );
    }

    #[test]
    fn test_into_record_rejects_scalars() {
        assert!(into_record(serde_json::json!({"id": "x"})).is_ok());
        assert!(into_record(serde_json::json!(42)).is_err());
    }
}
