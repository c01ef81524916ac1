//! Folder entity model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use secretaria_core::types::{AreaId, FolderId};

use super::category::{FolderCategory, FolderColor};
use crate::scope::{ModuleType, Scope};

/// A categorised folder owned by one `(area, module)` scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    /// Unique folder identifier, generated when the folder is created.
    pub id: FolderId,
    /// Folder name.
    pub name: String,
    /// Date the user assigned to the folder.
    pub date: NaiveDate,
    /// Contractual phase; fixed at creation.
    pub category: FolderCategory,
    /// Display color.
    pub color: FolderColor,
    /// Owning area.
    pub area_id: AreaId,
    /// Owning module.
    pub module_type: ModuleType,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
    /// When the folder was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Folder {
    /// Build a new folder in the given scope with a fresh id.
    pub fn create(scope: Scope, data: NewFolder) -> Self {
        let now = Utc::now();
        Self {
            id: FolderId::new(),
            name: data.name.trim().to_string(),
            date: data.date,
            category: data.category,
            color: data.color,
            area_id: scope.area_id,
            module_type: scope.module_type,
            created_at: now,
            updated_at: now,
        }
    }

    /// Return a copy with the patch applied.
    ///
    /// `updated_at` only moves when a field actually changes, so applying
    /// the same patch twice yields identical records.
    pub fn patched(&self, patch: &FolderPatch) -> Self {
        let name = patch.name.trim();
        if self.name == name && self.date == patch.date && self.color == patch.color {
            return self.clone();
        }
        Self {
            name: name.to_string(),
            date: patch.date,
            color: patch.color,
            updated_at: Utc::now(),
            ..self.clone()
        }
    }

    /// Whether the folder belongs to the given scope.
    pub fn in_scope(&self, scope: &Scope) -> bool {
        self.area_id == scope.area_id && self.module_type == scope.module_type
    }
}

/// Data required to create a new folder.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewFolder {
    /// Folder name.
    #[validate(custom(function = "not_blank"), length(max = 200))]
    pub name: String,
    /// Folder date.
    pub date: NaiveDate,
    /// Contractual phase.
    pub category: FolderCategory,
    /// Display color.
    pub color: FolderColor,
}

/// Editable folder fields. The category is deliberately absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct FolderPatch {
    /// New name.
    #[validate(custom(function = "not_blank"), length(max = 200))]
    pub name: String,
    /// New date.
    pub date: NaiveDate,
    /// New color.
    pub color: FolderColor,
}

impl From<&Folder> for FolderPatch {
    fn from(folder: &Folder) -> Self {
        Self {
            name: folder.name.clone(),
            date: folder.date,
            color: folder.color,
        }
    }
}

pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("must not be empty".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use secretaria_core::types::AreaId;

    fn scope() -> Scope {
        Scope::new(AreaId::new(), ModuleType::Proveedores)
    }

    fn new_folder(name: &str) -> NewFolder {
        NewFolder {
            name: name.to_string(),
            date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            category: FolderCategory::PreContractual,
            color: FolderColor::Blue,
        }
    }

    #[test]
    fn test_blank_name_rejected() {
        assert!(new_folder("   ").validate().is_err());
        assert!(new_folder("").validate().is_err());
        assert!(new_folder("Contrato 2025").validate().is_ok());
    }

    #[test]
    fn test_create_assigns_scope_and_trims() {
        let scope = scope();
        let folder = Folder::create(scope, new_folder("  Contrato 2025 "));
        assert_eq!(folder.name, "Contrato 2025");
        assert!(folder.in_scope(&scope));
        assert_eq!(folder.created_at, folder.updated_at);
    }

    #[test]
    fn test_patch_keeps_category() {
        let folder = Folder::create(scope(), new_folder("Contrato"));
        let patch = FolderPatch {
            name: "Contrato firmado".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            color: FolderColor::Green,
        };
        let updated = folder.patched(&patch);
        assert_eq!(updated.id, folder.id);
        assert_eq!(updated.category, FolderCategory::PreContractual);
        assert_eq!(updated.name, "Contrato firmado");
        assert_eq!(updated.color, FolderColor::Green);
        assert!(updated.updated_at >= folder.updated_at);
    }

    #[test]
    fn test_same_patch_is_idempotent() {
        let folder = Folder::create(scope(), new_folder("Contrato"));
        let patch = FolderPatch::from(&folder);
        let once = folder.patched(&patch);
        let twice = once.patched(&patch);
        assert_eq!(once, folder);
        assert_eq!(twice, once);
    }

    #[test]
    fn test_record_uses_camel_case_columns() {
        let folder = Folder::create(scope(), new_folder("Contrato"));
        let record = crate::record::to_record(&folder).unwrap();
        assert_eq!(record["category"], "preContractual");
        assert_eq!(record["moduleType"], "proveedores");
        assert_eq!(record["date"], "2025-01-10");
        assert!(record.contains_key("areaId"));
    }
}
