//! The document store: scoped working set plus optimistic mutations.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, RwLockReadGuard};
use tracing::{debug, info, warn};
use validator::Validate;

use secretaria_core::config::StoreConfig;
use secretaria_core::error::AppError;
use secretaria_core::events::ChangeEvent;
use secretaria_core::result::AppResult;
use secretaria_core::traits::notification::{Notification, NotificationSink};
use secretaria_core::traits::persistence::PersistenceBackend;
use secretaria_core::traits::upload::{UploadProvider, UploadTarget};
use secretaria_core::types::{DocumentId, Filters, FolderId, Table, UserId};
use secretaria_entity::record::{from_records, to_record};
use secretaria_entity::{
    Document, Folder, FolderCategory, FolderPatch, NewDocument, NewFolder, Scope,
};

use super::working_set::{CategorySummary, SearchResults, WorkingSet};

/// Columns sent to the backend when a folder is edited.
const FOLDER_EDITABLE_COLUMNS: [&str; 4] = ["name", "date", "color", "updatedAt"];

/// What happens to an optimistic local change when the backend call fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollbackPolicy {
    /// The local change stays; the error is only reported.
    #[default]
    KeepOptimistic,
    /// The local change is reverted before the error is returned.
    Compensate,
}

impl RollbackPolicy {
    /// Select the policy from the store configuration.
    pub fn from_config(config: &StoreConfig) -> Self {
        if config.rollback_on_error {
            Self::Compensate
        } else {
            Self::KeepOptimistic
        }
    }
}

/// Folder/document store for one `(area, module)` scope.
///
/// Every mutation updates the working set first and then the backend. On
/// success a success notification is emitted; on failure an error
/// notification is emitted and the error is returned.
#[derive(Debug)]
pub struct DocumentStore {
    scope: Scope,
    backend: Arc<dyn PersistenceBackend>,
    uploads: Arc<dyn UploadProvider>,
    notifier: Arc<dyn NotificationSink>,
    policy: RollbackPolicy,
    user_id: Option<UserId>,
    state: RwLock<WorkingSet>,
}

impl DocumentStore {
    /// Create an empty store for a scope. Call [`load`](Self::load) to
    /// populate it.
    pub fn new(
        scope: Scope,
        backend: Arc<dyn PersistenceBackend>,
        uploads: Arc<dyn UploadProvider>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            scope,
            backend,
            uploads,
            notifier,
            policy: RollbackPolicy::default(),
            user_id: None,
            state: RwLock::new(WorkingSet::default()),
        }
    }

    /// Set the rollback policy.
    pub fn with_policy(mut self, policy: RollbackPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Attribute uploads to a user.
    pub fn with_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// The store's scope.
    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// The active rollback policy.
    pub fn policy(&self) -> RollbackPolicy {
        self.policy
    }

    pub(crate) fn backend(&self) -> &Arc<dyn PersistenceBackend> {
        &self.backend
    }

    /// Replace the working set with the scope's rows from the backend.
    pub async fn load(&self) -> AppResult<()> {
        let filters = Filters::new()
            .where_eq("areaId", self.scope.area_id)
            .where_eq("moduleType", self.scope.module_type.as_str());
        let folders: Vec<Folder> =
            from_records(self.backend.read(Table::Carpetas, &filters).await?)?;

        let documents: Vec<Document> = if folders.is_empty() {
            Vec::new()
        } else {
            let filters = Filters::new().where_in("folderId", folders.iter().map(|f| f.id));
            from_records(self.backend.read(Table::Documentos, &filters).await?)?
        };

        info!(
            scope = %self.scope,
            folders = folders.len(),
            documents = documents.len(),
            "Working set loaded"
        );
        *self.state.write().await = WorkingSet::new(folders, documents);
        Ok(())
    }

    /// Create a folder in this scope.
    pub async fn add_folder(&self, data: NewFolder) -> AppResult<Folder> {
        if let Err(e) = data.validate() {
            return Err(self.reject(
                "No se pudo crear la carpeta",
                AppError::validation(e.to_string()),
            ));
        }

        let folder = Folder::create(self.scope, data);
        let record = to_record(&folder)?;
        self.state.write().await.push_folder(folder.clone());

        if let Err(e) = self.backend.create(Table::Carpetas, record).await {
            if self.policy == RollbackPolicy::Compensate {
                let mut state = self.state.write().await;
                // Documents added meanwhile keep the folder in place.
                let count = state.document_count(folder.id);
                if count == 0 {
                    state.remove_folder(folder.id);
                } else {
                    warn!(
                        folder_id = %folder.id,
                        documents = count,
                        "Keeping unsaved folder that holds documents"
                    );
                }
            }
            return Err(self.reject("Error al crear la carpeta", e));
        }

        info!(
            folder_id = %folder.id,
            area_id = %folder.area_id,
            category = %folder.category,
            "Folder created"
        );
        self.notifier.notify(Notification::success(format!(
            "Carpeta \"{}\" creada",
            folder.name
        )));
        Ok(folder)
    }

    /// Edit a folder's name, date and color.
    pub async fn update_folder(
        &self,
        folder_id: FolderId,
        patch: FolderPatch,
    ) -> AppResult<Folder> {
        if let Err(e) = patch.validate() {
            return Err(self.reject(
                "No se pudo actualizar la carpeta",
                AppError::validation(e.to_string()),
            ));
        }

        let (previous, updated, partial) = {
            let mut state = self.state.write().await;
            let Some(current) = state.folder(folder_id) else {
                drop(state);
                return Err(self.reject(
                    "No se pudo actualizar la carpeta",
                    AppError::not_found(format!("Folder {folder_id} not found")),
                ));
            };
            let updated = current.patched(&patch);
            let mut partial = to_record(&updated)?;
            partial.retain(|column, _| FOLDER_EDITABLE_COLUMNS.contains(&column.as_str()));
            let previous = state
                .replace_folder(updated.clone())
                .ok_or_else(|| AppError::internal("Folder vanished during update"))?;
            (previous, updated, partial)
        };

        if let Err(e) = self
            .backend
            .update(Table::Carpetas, &folder_id.to_string(), partial)
            .await
        {
            if self.policy == RollbackPolicy::Compensate {
                self.state.write().await.replace_folder(previous);
            }
            return Err(self.reject("Error al actualizar la carpeta", e));
        }

        info!(folder_id = %folder_id, "Folder updated");
        self.notifier
            .notify(Notification::success("Carpeta actualizada"));
        Ok(updated)
    }

    /// Delete an empty folder.
    ///
    /// A folder that still holds documents is rejected with a conflict and
    /// nothing is changed.
    pub async fn delete_folder(&self, folder_id: FolderId) -> AppResult<()> {
        let (pos, removed) = {
            let mut state = self.state.write().await;
            let count = state.document_count(folder_id);
            if count > 0 {
                drop(state);
                warn!(
                    folder_id = %folder_id,
                    documents = count,
                    "Refusing to delete non-empty folder"
                );
                return Err(self.reject(
                    "No se puede eliminar la carpeta",
                    AppError::conflict(format!(
                        "La carpeta contiene {count} documento(s); elimínelos primero"
                    )),
                ));
            }
            match state.remove_folder(folder_id) {
                Some(entry) => entry,
                None => {
                    drop(state);
                    return Err(self.reject(
                        "No se puede eliminar la carpeta",
                        AppError::not_found(format!("Folder {folder_id} not found")),
                    ));
                }
            }
        };

        if let Err(e) = self
            .backend
            .delete(Table::Carpetas, &folder_id.to_string())
            .await
        {
            if self.policy == RollbackPolicy::Compensate {
                let mut state = self.state.write().await;
                if state.folder(folder_id).is_none() {
                    state.insert_folder_at(pos, removed);
                }
            }
            return Err(self.reject("Error al eliminar la carpeta", e));
        }

        info!(folder_id = %folder_id, "Folder deleted");
        self.notifier.notify(Notification::success(format!(
            "Carpeta \"{}\" eliminada",
            removed.name
        )));
        Ok(())
    }

    /// Upload a file and record it as a document of an existing folder.
    pub async fn add_document(&self, data: NewDocument) -> AppResult<Document> {
        if let Err(e) = data.validate() {
            return Err(self.reject(
                "No se pudo subir el documento",
                AppError::validation(e.to_string()),
            ));
        }

        let category = match self.state.read().await.folder(data.folder_id) {
            Some(folder) => folder.category,
            None => {
                return Err(self.reject(
                    "No se pudo subir el documento",
                    AppError::not_found(format!("Folder {} not found", data.folder_id)),
                ));
            }
        };

        let target = UploadTarget {
            area_id: self.scope.area_id,
            module: self.scope.module_type.as_str().to_string(),
            category: category.as_str().to_string(),
            user_id: self.user_id,
        };
        let receipt = match self.uploads.upload(data.file, &target).await {
            Ok(receipt) => receipt,
            Err(e) => return Err(self.reject("Error al subir el archivo", e)),
        };
        debug!(key = %receipt.key, size = receipt.size_bytes, "Payload uploaded");

        let document = Document::from_upload(
            &data.name,
            data.description.as_deref(),
            data.folder_id,
            receipt,
        );
        let record = to_record(&document)?;

        {
            let mut state = self.state.write().await;
            if state.folder(document.folder_id).is_none() {
                drop(state);
                self.discard_blob(&document.storage_key).await;
                return Err(self.reject(
                    "No se pudo subir el documento",
                    AppError::not_found(format!("Folder {} not found", document.folder_id)),
                ));
            }
            state.push_document(document.clone());
        }

        if let Err(e) = self.backend.create(Table::Documentos, record).await {
            if self.policy == RollbackPolicy::Compensate {
                self.state.write().await.remove_document(document.id);
                self.discard_blob(&document.storage_key).await;
            }
            return Err(self.reject("Error al guardar el documento", e));
        }

        info!(
            document_id = %document.id,
            folder_id = %document.folder_id,
            size = document.size_bytes,
            "Document added"
        );
        self.notifier.notify(Notification::success(format!(
            "Documento \"{}\" subido",
            document.name
        )));
        Ok(document)
    }

    /// Hard-delete a document. The stored file is removed best-effort.
    pub async fn delete_document(&self, document_id: DocumentId) -> AppResult<()> {
        let removed = self.state.write().await.remove_document(document_id);
        let Some((pos, document)) = removed else {
            return Err(self.reject(
                "No se pudo eliminar el documento",
                AppError::not_found(format!("Document {document_id} not found")),
            ));
        };

        if let Err(e) = self
            .backend
            .delete(Table::Documentos, &document_id.to_string())
            .await
        {
            if self.policy == RollbackPolicy::Compensate {
                let mut state = self.state.write().await;
                if state.document(document_id).is_none() {
                    state.insert_document_at(pos, document);
                }
            }
            return Err(self.reject("Error al eliminar el documento", e));
        }

        self.discard_blob(&document.storage_key).await;
        info!(document_id = %document_id, folder_id = %document.folder_id, "Document deleted");
        self.notifier.notify(Notification::success(format!(
            "Documento \"{}\" eliminado",
            document.name
        )));
        Ok(())
    }

    /// Feed a backend change event into the working set.
    pub async fn apply_change(&self, event: &ChangeEvent) -> AppResult<bool> {
        self.state.write().await.apply(&self.scope, event)
    }

    /// Read access to the whole working set.
    pub async fn snapshot(&self) -> RwLockReadGuard<'_, WorkingSet> {
        self.state.read().await
    }

    /// All folders of the scope.
    pub async fn folders(&self) -> Vec<Folder> {
        self.state.read().await.folders().to_vec()
    }

    /// All documents of the scope.
    pub async fn documents(&self) -> Vec<Document> {
        self.state.read().await.documents().to_vec()
    }

    /// Look up a folder.
    pub async fn folder(&self, folder_id: FolderId) -> Option<Folder> {
        self.state.read().await.folder(folder_id).cloned()
    }

    /// Folders under a category tab.
    pub async fn folders_in_category(&self, category: FolderCategory) -> Vec<Folder> {
        self.state.read().await.folders_in_category(category)
    }

    /// Documents of a folder.
    pub async fn documents_in_folder(&self, folder_id: FolderId) -> Vec<Document> {
        self.state.read().await.documents_in_folder(folder_id)
    }

    /// Number of documents in a folder.
    pub async fn document_count(&self, folder_id: FolderId) -> usize {
        self.state.read().await.document_count(folder_id)
    }

    /// Free-text search over the working set.
    pub async fn search(&self, query: &str) -> SearchResults {
        self.state.read().await.search(query)
    }

    /// Per-category counts.
    pub async fn category_summary(&self) -> Vec<CategorySummary> {
        self.state.read().await.category_summary()
    }

    async fn discard_blob(&self, key: &str) {
        if let Err(e) = self.uploads.remove(key).await {
            warn!(key = %key, error = %e, "Failed to remove stored file");
        }
    }

    /// Report a failure to the user and hand the error back.
    fn reject(&self, context: &str, err: AppError) -> AppError {
        self.notifier
            .notify(Notification::error(format!("{context}: {}", err.message)));
        err
    }
}
