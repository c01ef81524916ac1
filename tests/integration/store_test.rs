//! Integration tests for the folder/document lifecycle.

mod helpers;

use secretaria_core::error::ErrorKind;
use secretaria_core::traits::notification::NotificationLevel;
use secretaria_core::traits::persistence::PersistenceBackend;
use secretaria_core::types::{Filters, Table};
use secretaria_entity::{FolderCategory, FolderColor, FolderPatch};
use secretaria_service::RollbackPolicy;

use helpers::{TestApp, new_folder, pdf};

#[tokio::test]
async fn test_non_empty_folder_cannot_be_deleted() {
    let app = TestApp::new().await;
    let store = app.store().await;

    let folder = store
        .add_folder(new_folder("Contrato 2025", FolderCategory::PreContractual))
        .await
        .unwrap();
    let doc = store.add_document(pdf(folder.id, "Acta")).await.unwrap();
    app.sink.take();

    let err = store.delete_folder(folder.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
    assert!(store.folder(folder.id).await.is_some());
    assert_eq!(store.documents_in_folder(folder.id).await, vec![doc]);

    let notice = app.sink.last().unwrap();
    assert_eq!(notice.level, NotificationLevel::Error);

    let rows = app
        .backend
        .read(Table::Carpetas, &Filters::new())
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn test_folder_deletable_after_its_documents() {
    let app = TestApp::new().await;
    let store = app.store().await;

    let folder = store
        .add_folder(new_folder("Contrato 2025", FolderCategory::PreContractual))
        .await
        .unwrap();
    let doc = store.add_document(pdf(folder.id, "Acta")).await.unwrap();
    let stored = app.upload_dir.path().join(&doc.storage_key);
    assert!(stored.exists());

    store.delete_document(doc.id).await.unwrap();
    assert!(!stored.exists());
    store.delete_folder(folder.id).await.unwrap();

    assert!(store.folder(folder.id).await.is_none());
    assert!(store.folders().await.is_empty());
    let rows = app
        .backend
        .read(Table::Carpetas, &Filters::new())
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_document_metadata_comes_from_upload() {
    let app = TestApp::new().await;
    let store = app.store().await;

    let folder = store
        .add_folder(new_folder("Informes", FolderCategory::Execution))
        .await
        .unwrap();
    let doc = store.add_document(pdf(folder.id, "Informe")).await.unwrap();

    assert_eq!(doc.mime_type, "application/pdf");
    assert_eq!(doc.size_bytes, 24);
    assert!(doc.url.starts_with("http://localhost:8080/files/"));
    assert!(doc.storage_key.contains("/proveedores/execution/"));

    let tab = store.folders_in_category(FolderCategory::Execution).await;
    assert_eq!(tab.len(), 1);
    assert!(store.folders_in_category(FolderCategory::Closure).await.is_empty());
}

#[tokio::test]
async fn test_state_survives_reload() {
    let app = TestApp::new().await;
    let store = app.store().await;

    let folder = store
        .add_folder(new_folder("Contrato 2025", FolderCategory::PreContractual))
        .await
        .unwrap();
    store
        .update_folder(
            folder.id,
            FolderPatch {
                name: "Contrato 2025 firmado".to_string(),
                date: folder.date,
                color: FolderColor::Purple,
            },
        )
        .await
        .unwrap();
    store.add_document(pdf(folder.id, "Acta")).await.unwrap();

    let reopened = app.store().await;
    let reloaded = reopened.folder(folder.id).await.unwrap();
    assert_eq!(reloaded.name, "Contrato 2025 firmado");
    assert_eq!(reloaded.color, FolderColor::Purple);
    assert_eq!(reloaded.category, FolderCategory::PreContractual);
    assert_eq!(reopened.document_count(folder.id).await, 1);
    assert_eq!(*reopened.snapshot().await, *store.snapshot().await);
}

#[tokio::test]
async fn test_oversized_upload_rejected() {
    let app = TestApp::new().await;
    let store = app.store_with(RollbackPolicy::Compensate).await;
    let folder = store
        .add_folder(new_folder("Contrato", FolderCategory::PreContractual))
        .await
        .unwrap();

    let mut big = pdf(folder.id, "Planos");
    big.file.data = bytes::Bytes::from(vec![0u8; 2 * 1024 * 1024]);
    let err = store.add_document(big).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(store.document_count(folder.id).await, 0);
}

#[tokio::test]
async fn test_search_and_summary_over_scope() {
    let app = TestApp::new().await;
    let store = app.store().await;
    let contrato = store
        .add_folder(new_folder("Contrato 2025", FolderCategory::PreContractual))
        .await
        .unwrap();
    store
        .add_folder(new_folder("Cierre del contrato", FolderCategory::Closure))
        .await
        .unwrap();
    store.add_document(pdf(contrato.id, "Acta")).await.unwrap();

    let hits = store.search("contra").await;
    assert_eq!(hits.folders.len(), 2);
    assert_eq!(store.search("acta").await.documents.len(), 1);

    let summary = store.category_summary().await;
    let counts: Vec<(usize, usize)> = summary.iter().map(|s| (s.folders, s.documents)).collect();
    assert_eq!(counts, vec![(1, 1), (0, 0), (1, 0)]);
}
