//! In-memory working set of one scope and the change-event reducer.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::{debug, trace};

use secretaria_core::AppError;
use secretaria_core::events::{ChangeEvent, ChangeKind};
use secretaria_core::result::AppResult;
use secretaria_core::types::{DocumentId, FolderId, Table};
use secretaria_entity::record::from_record;
use secretaria_entity::{Document, Folder, FolderCategory, Scope};

/// Folders and documents currently held for a scope, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkingSet {
    folders: Vec<Folder>,
    documents: Vec<Document>,
}

/// Folder and document counts for one category tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    /// The category.
    pub category: FolderCategory,
    /// Folders in the category.
    pub folders: usize,
    /// Documents inside those folders.
    pub documents: usize,
}

/// Matches of a free-text search over the working set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResults {
    /// Folders whose name matches.
    pub folders: Vec<Folder>,
    /// Documents whose name or description matches.
    pub documents: Vec<Document>,
}

impl WorkingSet {
    /// Build a working set from loaded rows.
    pub fn new(folders: Vec<Folder>, documents: Vec<Document>) -> Self {
        Self { folders, documents }
    }

    /// All folders.
    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    /// All documents.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Look up a folder.
    pub fn folder(&self, id: FolderId) -> Option<&Folder> {
        self.folders.iter().find(|f| f.id == id)
    }

    /// Look up a document.
    pub fn document(&self, id: DocumentId) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == id)
    }

    /// Number of documents referencing a folder.
    pub fn document_count(&self, folder_id: FolderId) -> usize {
        self.documents
            .iter()
            .filter(|d| d.folder_id == folder_id)
            .count()
    }

    /// Folders displayed under a category tab.
    pub fn folders_in_category(&self, category: FolderCategory) -> Vec<Folder> {
        self.folders
            .iter()
            .filter(|f| f.category == category)
            .cloned()
            .collect()
    }

    /// Documents inside a folder.
    pub fn documents_in_folder(&self, folder_id: FolderId) -> Vec<Document> {
        self.documents
            .iter()
            .filter(|d| d.folder_id == folder_id)
            .cloned()
            .collect()
    }

    /// Case-insensitive substring search over folder names and document
    /// names/descriptions. A blank query matches nothing.
    pub fn search(&self, query: &str) -> SearchResults {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return SearchResults::default();
        }
        let hit = |text: &str| text.to_lowercase().contains(&needle);
        SearchResults {
            folders: self
                .folders
                .iter()
                .filter(|f| hit(&f.name))
                .cloned()
                .collect(),
            documents: self
                .documents
                .iter()
                .filter(|d| hit(&d.name) || d.description.as_deref().is_some_and(hit))
                .cloned()
                .collect(),
        }
    }

    /// Per-category counts, in tab order.
    pub fn category_summary(&self) -> Vec<CategorySummary> {
        FolderCategory::ALL
            .into_iter()
            .map(|category| {
                let folders: Vec<FolderId> = self
                    .folders
                    .iter()
                    .filter(|f| f.category == category)
                    .map(|f| f.id)
                    .collect();
                CategorySummary {
                    category,
                    folders: folders.len(),
                    documents: self
                        .documents
                        .iter()
                        .filter(|d| folders.contains(&d.folder_id))
                        .count(),
                }
            })
            .collect()
    }

    pub(crate) fn push_folder(&mut self, folder: Folder) {
        self.folders.push(folder);
    }

    /// Replace a folder by id, returning the previous record.
    pub(crate) fn replace_folder(&mut self, folder: Folder) -> Option<Folder> {
        let slot = self.folders.iter_mut().find(|f| f.id == folder.id)?;
        Some(std::mem::replace(slot, folder))
    }

    pub(crate) fn remove_folder(&mut self, id: FolderId) -> Option<(usize, Folder)> {
        let pos = self.folders.iter().position(|f| f.id == id)?;
        Some((pos, self.folders.remove(pos)))
    }

    pub(crate) fn insert_folder_at(&mut self, pos: usize, folder: Folder) {
        let pos = pos.min(self.folders.len());
        self.folders.insert(pos, folder);
    }

    pub(crate) fn push_document(&mut self, document: Document) {
        self.documents.push(document);
    }

    pub(crate) fn remove_document(&mut self, id: DocumentId) -> Option<(usize, Document)> {
        let pos = self.documents.iter().position(|d| d.id == id)?;
        Some((pos, self.documents.remove(pos)))
    }

    pub(crate) fn insert_document_at(&mut self, pos: usize, document: Document) {
        let pos = pos.min(self.documents.len());
        self.documents.insert(pos, document);
    }

    /// Apply a backend change event. Returns whether the working set changed.
    ///
    /// Rows are matched by id, so re-delivery of a row already present
    /// (including a local optimistic insert) never duplicates it. Folder
    /// updates older than the held record are ignored. Rows outside the
    /// scope, and documents whose folder is not held, are ignored. A folder
    /// that leaves the working set takes its documents with it.
    pub fn apply(&mut self, scope: &Scope, event: &ChangeEvent) -> AppResult<bool> {
        let changed = match (event.table, event.event_type) {
            (Table::Carpetas, ChangeKind::Insert | ChangeKind::Update) => match &event.new {
                Some(row) => self.upsert_folder(scope, from_record(row.clone())?),
                None => false,
            },
            (Table::Documentos, ChangeKind::Insert | ChangeKind::Update) => match &event.new {
                Some(row) => self.upsert_document(from_record(row.clone())?),
                None => false,
            },
            (Table::Carpetas, ChangeKind::Delete) => match event.row_id() {
                Some(raw) => self.drop_folder(parse_id(raw)?),
                None => false,
            },
            (Table::Documentos, ChangeKind::Delete) => match event.row_id() {
                Some(raw) => self.remove_document(parse_id(raw)?).is_some(),
                None => false,
            },
            (Table::Areas, _) => false,
        };
        trace!(table = %event.table, kind = %event.event_type, changed, "Applied change");
        Ok(changed)
    }

    fn upsert_folder(&mut self, scope: &Scope, incoming: Folder) -> bool {
        let held = self.folders.iter().position(|f| f.id == incoming.id);
        match (held, incoming.in_scope(scope)) {
            (Some(pos), true) => {
                let current = &mut self.folders[pos];
                if incoming.updated_at < current.updated_at || *current == incoming {
                    return false;
                }
                *current = incoming;
                true
            }
            (Some(_), false) => self.drop_folder(incoming.id),
            (None, true) => {
                self.folders.push(incoming);
                true
            }
            (None, false) => false,
        }
    }

    /// Remove a folder and every document held under it.
    fn drop_folder(&mut self, id: FolderId) -> bool {
        if self.remove_folder(id).is_none() {
            return false;
        }
        let before = self.documents.len();
        self.documents.retain(|d| d.folder_id != id);
        let dropped = before - self.documents.len();
        if dropped > 0 {
            debug!(folder_id = %id, dropped, "Dropped documents of a removed folder");
        }
        true
    }

    fn upsert_document(&mut self, incoming: Document) -> bool {
        if self.folder(incoming.folder_id).is_none() {
            return self.remove_document(incoming.id).is_some();
        }
        match self.documents.iter_mut().find(|d| d.id == incoming.id) {
            Some(current) if *current == incoming => false,
            Some(current) => {
                *current = incoming;
                true
            }
            None => {
                self.documents.push(incoming);
                true
            }
        }
    }
}

fn parse_id<T>(raw: &str) -> AppResult<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.parse()
        .map_err(|e| AppError::validation(format!("Malformed row id '{raw}': {e}")))
}
