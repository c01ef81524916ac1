//! Document management CLI commands.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use secretaria_core::error::{AppError, ErrorKind};
use secretaria_core::traits::upload::UploadFile;
use secretaria_core::types::{DocumentId, FolderId};
use secretaria_entity::{Document, NewDocument};

use super::{Context, ScopeArgs};
use crate::output::{self, OutputFormat};

/// Arguments for document commands
#[derive(Debug, Args)]
pub struct DocumentArgs {
    /// Scope the documents belong to
    #[command(flatten)]
    pub scope: ScopeArgs,
    /// Document subcommand
    #[command(subcommand)]
    pub command: DocumentCommand,
}

/// Document subcommands
#[derive(Debug, Subcommand)]
pub enum DocumentCommand {
    /// List documents, optionally of a single folder
    List {
        /// Folder ID
        #[arg(long)]
        folder: Option<FolderId>,
    },
    /// Upload a file into a folder
    Add {
        /// Target folder ID
        #[arg(long)]
        folder: FolderId,
        /// File to upload
        file: PathBuf,
        /// Display name (defaults to the file name)
        #[arg(short, long)]
        name: Option<String>,
        /// Description
        #[arg(short, long)]
        description: Option<String>,
        /// MIME type (detected from the extension when omitted)
        #[arg(long)]
        mime_type: Option<String>,
    },
    /// Delete a document
    Delete {
        /// Document ID
        id: DocumentId,
    },
}

/// Document display row
#[derive(Debug, Serialize, Tabled)]
pub struct DocumentRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Nombre")]
    name: String,
    #[tabled(rename = "Carpeta")]
    folder_id: String,
    #[tabled(rename = "Tipo")]
    mime_type: String,
    #[tabled(rename = "Tamaño")]
    size: String,
    #[tabled(rename = "Creado")]
    created_at: String,
    #[tabled(rename = "URL")]
    url: String,
}

impl From<&Document> for DocumentRow {
    fn from(doc: &Document) -> Self {
        Self {
            id: doc.id.to_string(),
            name: doc.name.clone(),
            folder_id: doc.folder_id.to_string(),
            mime_type: doc.mime_type.clone(),
            size: human_size(doc.size_bytes),
            created_at: doc.created_at.format("%Y-%m-%d %H:%M").to_string(),
            url: doc.url.clone(),
        }
    }
}

/// Execute document commands
pub async fn execute(
    args: &DocumentArgs,
    ctx: &Context,
    format: OutputFormat,
) -> Result<(), AppError> {
    let store = ctx.open_store(args.scope.scope()).await?;

    match &args.command {
        DocumentCommand::List { folder } => {
            let documents = match folder {
                Some(folder_id) => store.documents_in_folder(*folder_id).await,
                None => store.documents().await,
            };
            let rows: Vec<DocumentRow> = documents.iter().map(DocumentRow::from).collect();
            output::print_list(&rows, format);
        }
        DocumentCommand::Add {
            folder,
            file,
            name,
            description,
            mime_type,
        } => {
            let upload = read_upload(file, mime_type.clone()).await?;
            let name = name.clone().unwrap_or_else(|| upload.file_name.clone());
            let document = store
                .add_document(NewDocument {
                    name,
                    description: description.clone(),
                    folder_id: *folder,
                    file: upload,
                })
                .await?;
            output::print_item(&DocumentRow::from(&document), format);
        }
        DocumentCommand::Delete { id } => {
            store.delete_document(*id).await?;
        }
    }

    Ok(())
}

async fn read_upload(path: &Path, mime_type: Option<String>) -> Result<UploadFile, AppError> {
    let data = tokio::fs::read(path).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Storage,
            format!("Failed to read '{}'", path.display()),
            e,
        )
    })?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| AppError::validation(format!("'{}' is not a file", path.display())))?;
    Ok(UploadFile {
        file_name,
        mime_type,
        data: Bytes::from(data),
    })
}

fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} {}", UNITS[0])
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(2048), "2.0 KB");
        assert_eq!(human_size(52_428_800), "50.0 MB");
    }
}
