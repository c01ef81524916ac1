//! Integration tests for keeping stores in sync through the change feed.

mod helpers;

use secretaria_entity::{FolderCategory, FolderColor, FolderPatch};

use helpers::{TestApp, eventually, new_folder, pdf};

#[tokio::test]
async fn test_second_store_follows_changes() {
    let app = TestApp::new().await;
    let writer = app.store().await;
    let reader = app.store().await;
    let _watcher = reader.watch().await.unwrap();

    let folder = writer
        .add_folder(new_folder("Contrato 2025", FolderCategory::PreContractual))
        .await
        .unwrap();
    let doc = writer.add_document(pdf(folder.id, "Acta")).await.unwrap();

    assert!(eventually(&reader, |set| set.document_count(folder.id) == 1).await);
    assert_eq!(reader.folder(folder.id).await.unwrap().name, "Contrato 2025");

    writer
        .update_folder(
            folder.id,
            FolderPatch {
                name: "Contrato 2025 firmado".to_string(),
                date: folder.date,
                color: FolderColor::Green,
            },
        )
        .await
        .unwrap();
    assert!(
        eventually(&reader, |set| set
            .folder(folder.id)
            .is_some_and(|f| f.color == FolderColor::Green))
        .await
    );

    writer.delete_document(doc.id).await.unwrap();
    writer.delete_folder(folder.id).await.unwrap();
    assert!(
        eventually(&reader, |set| set.folders().is_empty() && set.documents().is_empty()).await
    );
}

#[tokio::test]
async fn test_own_echo_is_not_duplicated() {
    let app = TestApp::new().await;
    let store = app.store().await;
    let _watcher = store.watch().await.unwrap();

    let folder = store
        .add_folder(new_folder("Contrato 2025", FolderCategory::PreContractual))
        .await
        .unwrap();
    store.add_document(pdf(folder.id, "Acta")).await.unwrap();

    // Give the watcher time to deliver the echoes of both inserts.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert_eq!(store.folders().await.len(), 1);
    assert_eq!(store.documents().await.len(), 1);
}

#[tokio::test]
async fn test_other_scope_changes_are_ignored() {
    let app = TestApp::new().await;
    let reader = app.store().await;
    let _watcher = reader.watch().await.unwrap();

    let mut other = TestApp::new().await;
    other.backend = app.backend.clone();
    let writer = other.store().await;
    writer
        .add_folder(new_folder("Ajena", FolderCategory::Execution))
        .await
        .unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert!(reader.folders().await.is_empty());
}

#[tokio::test]
async fn test_watcher_stops_on_drop() {
    let app = TestApp::new().await;
    let reader = app.store().await;
    let writer = app.store().await;

    let watcher = reader.watch().await.unwrap();
    assert!(!watcher.is_finished());
    watcher.stop();

    writer
        .add_folder(new_folder("Contrato", FolderCategory::Closure))
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert!(reader.folders().await.is_empty());
}

#[tokio::test]
async fn test_folder_deleted_elsewhere_takes_its_documents() {
    let app = TestApp::new().await;
    let reader = app.store().await;
    let folder = reader
        .add_folder(new_folder("Contrato 2025", FolderCategory::PreContractual))
        .await
        .unwrap();

    // Opened before the upload and not watching, so it sees the folder as empty.
    let stale = app.store().await;
    let _watcher = reader.watch().await.unwrap();
    reader.add_document(pdf(folder.id, "Acta")).await.unwrap();

    stale.delete_folder(folder.id).await.unwrap();
    assert!(
        eventually(&reader, |set| set.folder(folder.id).is_none() && set.documents().is_empty())
            .await
    );
}
