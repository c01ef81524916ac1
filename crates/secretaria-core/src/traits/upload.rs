//! Upload side-channel: turns a raw payload into a retrievable URL.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;
use crate::types::id::{AreaId, UserId};

/// A raw file handed to the uploader.
#[derive(Debug, Clone)]
pub struct UploadFile {
    /// Original file name, including extension.
    pub file_name: String,
    /// MIME type reported by the caller, if any.
    pub mime_type: Option<String>,
    /// File content.
    pub data: Bytes,
}

/// Where an upload belongs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadTarget {
    /// Owning area.
    pub area_id: AreaId,
    /// Module path segment (e.g. `proveedores`).
    pub module: String,
    /// Category path segment (e.g. `preContractual`).
    pub category: String,
    /// The uploading user, if known.
    pub user_id: Option<UserId>,
}

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadReceipt {
    /// Public URL the file can be retrieved from.
    pub url: String,
    /// Storage key, used to remove the file later.
    pub key: String,
    /// Stored size in bytes.
    pub size_bytes: u64,
    /// Resolved MIME type.
    pub mime_type: String,
}

/// Trait for upload providers.
#[async_trait]
pub trait UploadProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g. `"local"`).
    fn provider_type(&self) -> &str;

    /// Store a file and return its URL and metadata.
    async fn upload(&self, file: UploadFile, target: &UploadTarget) -> AppResult<UploadReceipt>;

    /// Remove a previously uploaded file by key.
    async fn remove(&self, key: &str) -> AppResult<()>;
}
