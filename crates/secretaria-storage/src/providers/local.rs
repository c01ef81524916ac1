//! Local filesystem upload provider.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use secretaria_core::config::StorageConfig;
use secretaria_core::error::{AppError, ErrorKind};
use secretaria_core::result::AppResult;
use secretaria_core::traits::upload::{UploadFile, UploadProvider, UploadReceipt, UploadTarget};

use crate::mime::resolve_mime;

/// Writes uploads under a root directory and serves them from a base URL.
///
/// Keys have the shape `{area}/{module}/{category}/{uuid}-{file name}`.
#[derive(Debug, Clone)]
pub struct LocalUploadProvider {
    root: PathBuf,
    public_base_url: String,
    max_upload_size_bytes: u64,
}

impl LocalUploadProvider {
    /// Create a provider rooted at `config.root_path`, creating the root if needed.
    pub async fn new(config: &StorageConfig) -> AppResult<Self> {
        let root = PathBuf::from(&config.root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create upload root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self {
            root,
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
            max_upload_size_bytes: config.max_upload_size_bytes,
        })
    }

    /// Resolve a storage key to a path within the root, refusing keys that
    /// would escape it.
    fn resolve(&self, key: &str) -> AppResult<PathBuf> {
        let relative = Path::new(key.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(AppError::validation(format!("Invalid storage key: {key}")));
        }
        Ok(self.root.join(relative))
    }

    /// Ensure the parent directory of a path exists.
    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }
}

/// Reduce a user-supplied file name to a safe single path segment.
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '-' | '_' => c,
            _ => '_',
        })
        .collect();
    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() {
        "archivo".to_string()
    } else {
        cleaned.to_string()
    }
}

#[async_trait]
impl UploadProvider for LocalUploadProvider {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn upload(&self, file: UploadFile, target: &UploadTarget) -> AppResult<UploadReceipt> {
        if file.data.is_empty() {
            return Err(AppError::validation("Uploaded file is empty"));
        }
        let size_bytes = file.data.len() as u64;
        if size_bytes > self.max_upload_size_bytes {
            return Err(AppError::validation(format!(
                "File exceeds maximum upload size of {} bytes",
                self.max_upload_size_bytes
            )));
        }

        let key = format!(
            "{}/{}/{}/{}-{}",
            target.area_id,
            target.module,
            target.category,
            Uuid::new_v4(),
            sanitize_file_name(&file.file_name)
        );
        let full_path = self.resolve(&key)?;
        self.ensure_parent(&full_path).await?;

        fs::write(&full_path, &file.data).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write upload: {key}"),
                e,
            )
        })?;

        debug!(key, bytes = size_bytes, user_id = ?target.user_id, "Stored upload");
        Ok(UploadReceipt {
            url: self.public_url(&key),
            mime_type: resolve_mime(&file.file_name, file.mime_type.as_deref()),
            size_bytes,
            key,
        })
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        let full_path = self.resolve(key)?;
        fs::remove_file(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Upload not found: {key}"))
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to remove upload: {key}"),
                    e,
                )
            }
        })?;
        debug!(key, "Removed upload");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use secretaria_core::types::AreaId;

    async fn provider(dir: &tempfile::TempDir, max: u64) -> LocalUploadProvider {
        let config = StorageConfig {
            root_path: dir.path().to_str().unwrap().to_string(),
            public_base_url: "http://localhost:8080/files/".to_string(),
            max_upload_size_bytes: max,
        };
        LocalUploadProvider::new(&config).await.unwrap()
    }

    fn target() -> UploadTarget {
        UploadTarget {
            area_id: AreaId::new(),
            module: "proveedores".to_string(),
            category: "preContractual".to_string(),
            user_id: None,
        }
    }

    fn pdf(bytes: usize) -> UploadFile {
        UploadFile {
            file_name: "Acta de inicio.pdf".to_string(),
            mime_type: None,
            data: Bytes::from(vec![b'x'; bytes]),
        }
    }

    #[tokio::test]
    async fn test_upload_then_remove() {
        let dir = tempfile::tempdir().unwrap();
        let provider = provider(&dir, 1 << 20).await;
        let target = target();

        let receipt = provider.upload(pdf(1024), &target).await.unwrap();
        assert_eq!(receipt.size_bytes, 1024);
        assert_eq!(receipt.mime_type, "application/pdf");
        let prefix = format!("{}/proveedores/preContractual/", target.area_id);
        assert!(receipt.key.starts_with(&prefix));
        assert!(receipt.key.ends_with("-Acta_de_inicio.pdf"));
        assert_eq!(receipt.url, format!("http://localhost:8080/files/{}", receipt.key));
        assert!(dir.path().join(&receipt.key).exists());

        provider.remove(&receipt.key).await.unwrap();
        assert!(!dir.path().join(&receipt.key).exists());
        let err = provider.remove(&receipt.key).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_rejects_empty_and_oversized() {
        let dir = tempfile::tempdir().unwrap();
        let provider = provider(&dir, 10).await;
        let err = provider.upload(pdf(0), &target()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        let err = provider.upload(pdf(11), &target()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_remove_refuses_escaping_keys() {
        let dir = tempfile::tempdir().unwrap();
        let provider = provider(&dir, 10).await;
        let err = provider.remove("../outside.txt").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("informe final.docx"), "informe_final.docx");
        assert_eq!(sanitize_file_name(".."), "archivo");
    }
}
