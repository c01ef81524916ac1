//! Document entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use secretaria_core::traits::upload::{UploadFile, UploadReceipt};
use secretaria_core::types::{DocumentId, FolderId};

use crate::folder::model::not_blank;

/// A file placed inside a folder.
///
/// Documents are never updated in place; they are created from an upload
/// and hard-deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Unique document identifier.
    pub id: DocumentId,
    /// Display name.
    pub name: String,
    /// Optional free-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// The owning folder.
    pub folder_id: FolderId,
    /// MIME type of the uploaded file.
    pub mime_type: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Retrievable URL.
    pub url: String,
    /// Storage key the uploader assigned.
    pub storage_key: String,
    /// When the document was created.
    pub created_at: DateTime<Utc>,
}

impl Document {
    /// Combine caller-supplied fields with upload metadata.
    pub fn from_upload(
        name: &str,
        description: Option<&str>,
        folder_id: FolderId,
        receipt: UploadReceipt,
    ) -> Self {
        Self {
            id: DocumentId::new(),
            name: name.trim().to_string(),
            description: description
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            folder_id,
            mime_type: receipt.mime_type,
            size_bytes: receipt.size_bytes,
            url: receipt.url,
            storage_key: receipt.key,
            created_at: Utc::now(),
        }
    }
}

/// Data required to upload a new document.
#[derive(Debug, Clone, Validate)]
pub struct NewDocument {
    /// Display name.
    #[validate(custom(function = "not_blank"), length(max = 255))]
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Target folder.
    pub folder_id: FolderId,
    /// The raw file.
    pub file: UploadFile,
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn receipt() -> UploadReceipt {
        UploadReceipt {
            url: "http://localhost/files/a/acta.pdf".to_string(),
            key: "a/acta.pdf".to_string(),
            size_bytes: 1024,
            mime_type: "application/pdf".to_string(),
        }
    }

    #[test]
    fn test_from_upload_copies_metadata() {
        let folder_id = FolderId::new();
        let doc = Document::from_upload("Acta", Some(""), folder_id, receipt());
        assert_eq!(doc.folder_id, folder_id);
        assert_eq!(doc.size_bytes, 1024);
        assert_eq!(doc.mime_type, "application/pdf");
        assert!(doc.description.is_none());
        assert!(!doc.url.is_empty());
    }

    #[test]
    fn test_blank_name_rejected() {
        let doc = NewDocument {
            name: " ".to_string(),
            description: None,
            folder_id: FolderId::new(),
            file: UploadFile {
                file_name: "acta.pdf".to_string(),
                mime_type: None,
                data: Bytes::from_static(b"%PDF"),
            },
        };
        assert!(doc.validate().is_err());
    }
}
