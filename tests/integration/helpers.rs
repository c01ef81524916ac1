//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::NaiveDate;
use tempfile::TempDir;

use secretaria_core::config::StorageConfig;
use secretaria_core::traits::upload::UploadFile;
use secretaria_core::types::{AreaId, FolderId};
use secretaria_database::MemoryBackend;
use secretaria_entity::{FolderCategory, FolderColor, ModuleType, NewDocument, NewFolder, Scope};
use secretaria_service::{DocumentStore, MemorySink, RollbackPolicy, WorkingSet};
use secretaria_storage::LocalUploadProvider;

/// Test application context: shared backend, upload root and notification sink
pub struct TestApp {
    /// Backend shared by every store opened from this app
    pub backend: Arc<MemoryBackend>,
    /// Local uploader writing under `upload_dir`
    pub uploads: Arc<LocalUploadProvider>,
    /// Notifications of every store opened from this app
    pub sink: Arc<MemorySink>,
    /// The scope tests operate in
    pub scope: Scope,
    /// Upload root, removed on drop
    pub upload_dir: TempDir,
}

impl TestApp {
    /// Create a new test application with an empty backend
    pub async fn new() -> Self {
        let upload_dir = tempfile::tempdir().expect("Failed to create upload dir");
        let storage = StorageConfig {
            root_path: upload_dir.path().to_string_lossy().into_owned(),
            public_base_url: "http://localhost:8080/files".to_string(),
            max_upload_size_bytes: 1024 * 1024,
        };
        let uploads = LocalUploadProvider::new(&storage)
            .await
            .expect("Failed to init uploads");

        Self {
            backend: Arc::new(MemoryBackend::new(64)),
            uploads: Arc::new(uploads),
            sink: Arc::new(MemorySink::new()),
            scope: Scope::new(AreaId::new(), ModuleType::Proveedores),
            upload_dir,
        }
    }

    /// Open a store for the app's scope
    pub async fn store(&self) -> Arc<DocumentStore> {
        self.store_with(RollbackPolicy::KeepOptimistic).await
    }

    /// Open a store for the app's scope with a rollback policy
    pub async fn store_with(&self, policy: RollbackPolicy) -> Arc<DocumentStore> {
        let store = DocumentStore::new(
            self.scope,
            self.backend.clone(),
            self.uploads.clone(),
            self.sink.clone(),
        )
        .with_policy(policy);
        store.load().await.expect("Failed to load store");
        Arc::new(store)
    }
}

/// Folder creation data dated 2025-01-10
pub fn new_folder(name: &str, category: FolderCategory) -> NewFolder {
    NewFolder {
        name: name.to_string(),
        date: NaiveDate::from_ymd_opt(2025, 1, 10).expect("valid date"),
        category,
        color: FolderColor::Blue,
    }
}

/// A small PDF upload into `folder_id`
pub fn pdf(folder_id: FolderId, name: &str) -> NewDocument {
    NewDocument {
        name: name.to_string(),
        description: None,
        folder_id,
        file: UploadFile {
            file_name: format!("{}.pdf", name.to_lowercase()),
            mime_type: None,
            data: Bytes::from_static(b"%PDF-1.7\n%test document\n"),
        },
    }
}

/// Poll the store's working set until `check` holds or a second has passed
pub async fn eventually(store: &DocumentStore, check: impl Fn(&WorkingSet) -> bool) -> bool {
    for _ in 0..100 {
        if check(&*store.snapshot().await) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
