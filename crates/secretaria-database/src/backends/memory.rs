//! In-memory persistence backend.
//!
//! Holds every table as a vector of JSON records in insertion order and
//! reproduces the exact-match / set-membership filtering of the SQL
//! backend. Every write is announced through the backend's [`ChangeHub`].

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use secretaria_core::error::{AppError, ErrorKind};
use secretaria_core::events::ChangeEvent;
use secretaria_core::result::AppResult;
use secretaria_core::traits::persistence::{ChangeSubscription, PersistenceBackend};
use secretaria_core::types::{Filters, Record, Table};

use super::record_id;
use crate::hub::ChangeHub;

/// Seed data for the in-memory backend, one array per table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixtures {
    /// Rows of `areas`.
    #[serde(default)]
    pub areas: Vec<Record>,
    /// Rows of `carpetas`.
    #[serde(default)]
    pub carpetas: Vec<Record>,
    /// Rows of `documentos`.
    #[serde(default)]
    pub documentos: Vec<Record>,
}

impl Fixtures {
    fn into_tables(self) -> HashMap<Table, Vec<Record>> {
        HashMap::from([
            (Table::Areas, self.areas),
            (Table::Carpetas, self.carpetas),
            (Table::Documentos, self.documentos),
        ])
    }
}

/// In-memory substitute for the PostgreSQL backend.
#[derive(Debug)]
pub struct MemoryBackend {
    tables: RwLock<HashMap<Table, Vec<Record>>>,
    hub: ChangeHub,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new(channel_buffer: usize) -> Self {
        Self::with_fixtures(Fixtures::default(), channel_buffer)
    }

    /// Create a backend seeded with fixtures.
    pub fn with_fixtures(fixtures: Fixtures, channel_buffer: usize) -> Self {
        Self {
            tables: RwLock::new(fixtures.into_tables()),
            hub: ChangeHub::new(channel_buffer),
        }
    }

    /// Create a backend seeded from a JSON fixtures file.
    pub async fn from_fixture_file(
        path: impl AsRef<Path>,
        channel_buffer: usize,
    ) -> AppResult<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Failed to read fixtures: {}", path.display()),
                e,
            )
        })?;
        let fixtures: Fixtures = serde_json::from_str(&raw)?;
        info!(
            path = %path.display(),
            areas = fixtures.areas.len(),
            carpetas = fixtures.carpetas.len(),
            documentos = fixtures.documentos.len(),
            "Loaded fixtures"
        );
        Ok(Self::with_fixtures(fixtures, channel_buffer))
    }

    /// Write every table to a JSON fixtures file.
    pub async fn save_fixture_file(&self, path: impl AsRef<Path>) -> AppResult<()> {
        let path = path.as_ref();
        let raw = serde_json::to_string_pretty(&self.snapshot().await)?;
        tokio::fs::write(path, raw).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write fixtures: {}", path.display()),
                e,
            )
        })?;
        debug!(path = %path.display(), "Saved fixtures");
        Ok(())
    }

    /// Snapshot every table.
    pub async fn snapshot(&self) -> Fixtures {
        let tables = self.tables.read().await;
        let rows = |t: Table| tables.get(&t).cloned().unwrap_or_default();
        Fixtures {
            areas: rows(Table::Areas),
            carpetas: rows(Table::Carpetas),
            documentos: rows(Table::Documentos),
        }
    }
}

#[async_trait]
impl PersistenceBackend for MemoryBackend {
    fn backend_type(&self) -> &str {
        "memory"
    }

    async fn create(&self, table: Table, record: Record) -> AppResult<Record> {
        let id = record_id(&record)?;
        {
            let mut tables = self.tables.write().await;
            let rows = tables.entry(table).or_default();
            if rows.iter().any(|r| r.get("id").and_then(|v| v.as_str()) == Some(id.as_str())) {
                return Err(AppError::conflict(format!(
                    "Row '{id}' already exists in {table}"
                )));
            }
            rows.push(record.clone());
        }
        debug!(%table, id, "Inserted row");
        self.hub
            .publish(ChangeEvent::insert(table, record.clone()))
            .await;
        Ok(record)
    }

    async fn read(&self, table: Table, filters: &Filters) -> AppResult<Vec<Record>> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(&table)
            .map(|rows| rows.iter().filter(|r| filters.matches(r)).cloned().collect())
            .unwrap_or_default())
    }

    async fn update(&self, table: Table, id: &str, partial: Record) -> AppResult<Record> {
        let (old, new) = {
            let mut tables = self.tables.write().await;
            let row = tables
                .get_mut(&table)
                .and_then(|rows| {
                    rows.iter_mut()
                        .find(|r| r.get("id").and_then(|v| v.as_str()) == Some(id))
                })
                .ok_or_else(|| AppError::not_found(format!("Row '{id}' not found in {table}")))?;
            let old = row.clone();
            for (key, value) in partial {
                if key != "id" {
                    row.insert(key, value);
                }
            }
            (old, row.clone())
        };
        debug!(%table, id, "Updated row");
        self.hub
            .publish(ChangeEvent::update(table, old, new.clone()))
            .await;
        Ok(new)
    }

    async fn delete(&self, table: Table, id: &str) -> AppResult<bool> {
        let removed = {
            let mut tables = self.tables.write().await;
            tables.get_mut(&table).and_then(|rows| {
                rows.iter()
                    .position(|r| r.get("id").and_then(|v| v.as_str()) == Some(id))
                    .map(|pos| rows.remove(pos))
            })
        };
        match removed {
            Some(old) => {
                debug!(%table, id, "Deleted row");
                self.hub.publish(ChangeEvent::delete(table, old)).await;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn subscribe(&self, table: Table) -> AppResult<ChangeSubscription> {
        Ok(self.hub.subscribe(table).await)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secretaria_core::events::ChangeKind;
    use serde_json::json;

    fn row(value: serde_json::Value) -> Record {
        value.as_object().cloned().expect("object")
    }

    #[tokio::test]
    async fn test_create_read_filters() {
        let backend = MemoryBackend::new(16);
        backend
            .create(
                Table::Carpetas,
                row(json!({"id": "f1", "areaId": "a1", "moduleType": "proveedores"})),
            )
            .await
            .unwrap();
        backend
            .create(
                Table::Carpetas,
                row(json!({"id": "f2", "areaId": "a2", "moduleType": "proveedores"})),
            )
            .await
            .unwrap();

        let scoped = backend
            .read(Table::Carpetas, &Filters::new().where_eq("areaId", "a1"))
            .await
            .unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0]["id"], "f1");

        let both = backend
            .read(Table::Carpetas, &Filters::new().where_in("id", ["f1", "f2"]))
            .await
            .unwrap();
        assert_eq!(both.len(), 2);
    }

    #[tokio::test]
    async fn test_create_requires_unique_id() {
        let backend = MemoryBackend::new(16);
        let err = backend
            .create(Table::Carpetas, row(json!({"name": "sin id"})))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        backend.create(Table::Carpetas, row(json!({"id": "f1"}))).await.unwrap();
        let err = backend
            .create(Table::Carpetas, row(json!({"id": "f1"})))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_update_merges_and_keeps_id() {
        let backend = MemoryBackend::new(16);
        backend
            .create(Table::Carpetas, row(json!({"id": "f1", "name": "A", "color": "blue"})))
            .await
            .unwrap();
        let merged = backend
            .update(Table::Carpetas, "f1", row(json!({"id": "other", "name": "B"})))
            .await
            .unwrap();
        assert_eq!(merged["id"], "f1");
        assert_eq!(merged["name"], "B");
        assert_eq!(merged["color"], "blue");

        let err = backend
            .update(Table::Carpetas, "missing", Record::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_delete_reports_removal() {
        let backend = MemoryBackend::new(16);
        backend.create(Table::Documentos, row(json!({"id": "d1"}))).await.unwrap();
        assert!(backend.delete(Table::Documentos, "d1").await.unwrap());
        assert!(!backend.delete(Table::Documentos, "d1").await.unwrap());
    }

    #[tokio::test]
    async fn test_writes_are_published_in_order() {
        let backend = MemoryBackend::new(16);
        let mut sub = backend.subscribe(Table::Carpetas).await.unwrap();

        backend.create(Table::Carpetas, row(json!({"id": "f1", "name": "A"}))).await.unwrap();
        backend
            .update(Table::Carpetas, "f1", row(json!({"name": "B"})))
            .await
            .unwrap();
        backend.delete(Table::Carpetas, "f1").await.unwrap();

        let kinds = [
            sub.recv().await.unwrap(),
            sub.recv().await.unwrap(),
            sub.recv().await.unwrap(),
        ];
        assert_eq!(kinds[0].event_type, ChangeKind::Insert);
        assert_eq!(kinds[1].event_type, ChangeKind::Update);
        assert_eq!(kinds[1].old.as_ref().unwrap()["name"], "A");
        assert_eq!(kinds[1].new.as_ref().unwrap()["name"], "B");
        assert_eq!(kinds[2].event_type, ChangeKind::Delete);
    }

    #[tokio::test]
    async fn test_fixture_file_seeds_tables() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixtures.json");
        std::fs::write(
            &path,
            r#"{"areas": [{"id": "a1", "name": "Calidad Educativa"}]}"#,
        )
        .unwrap();

        let backend = MemoryBackend::from_fixture_file(&path, 16).await.unwrap();
        let areas = backend.read(Table::Areas, &Filters::new()).await.unwrap();
        assert_eq!(areas.len(), 1);
        assert!(backend.snapshot().await.carpetas.is_empty());
    }

    #[tokio::test]
    async fn test_saved_fixtures_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let backend = MemoryBackend::new(16);
        backend
            .create(Table::Carpetas, row(json!({"id": "f1", "name": "Contrato 2025"})))
            .await
            .unwrap();
        backend.save_fixture_file(&path).await.unwrap();

        let reloaded = MemoryBackend::from_fixture_file(&path, 16).await.unwrap();
        let folders = reloaded.read(Table::Carpetas, &Filters::new()).await.unwrap();
        assert_eq!(folders.len(), 1);
        assert_eq!(folders[0]["name"], "Contrato 2025");
    }
}
