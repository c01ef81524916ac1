//! Folder management CLI commands.

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use secretaria_core::error::AppError;
use secretaria_core::types::FolderId;
use secretaria_entity::{Folder, FolderCategory, FolderColor, FolderPatch, NewFolder};

use super::{Context, ScopeArgs};
use crate::output::{self, OutputFormat};

/// Arguments for folder commands
#[derive(Debug, Args)]
pub struct FolderArgs {
    /// Scope the folders belong to
    #[command(flatten)]
    pub scope: ScopeArgs,
    /// Folder subcommand
    #[command(subcommand)]
    pub command: FolderCommand,
}

/// Folder subcommands
#[derive(Debug, Subcommand)]
pub enum FolderCommand {
    /// List folders, optionally only one category tab
    List {
        /// Category (`preContractual`, `execution`, `closure`)
        #[arg(short, long)]
        category: Option<FolderCategory>,
    },
    /// Create a new folder
    Create {
        /// Folder name
        #[arg(short, long)]
        name: String,
        /// Folder date (YYYY-MM-DD)
        #[arg(short, long)]
        date: NaiveDate,
        /// Category (`preContractual`, `execution`, `closure`)
        #[arg(short, long)]
        category: FolderCategory,
        /// Color
        #[arg(long, default_value = "blue")]
        color: FolderColor,
    },
    /// Edit a folder's name, date or color
    Update {
        /// Folder ID
        id: FolderId,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// New date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<NaiveDate>,
        /// New color
        #[arg(long)]
        color: Option<FolderColor>,
    },
    /// Delete an empty folder
    Delete {
        /// Folder ID
        id: FolderId,
    },
}

/// Folder display row
#[derive(Debug, Serialize, Tabled)]
pub struct FolderRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Nombre")]
    name: String,
    #[tabled(rename = "Fecha")]
    date: String,
    #[tabled(rename = "Categoría")]
    category: String,
    #[tabled(rename = "Color")]
    color: String,
    #[tabled(rename = "Documentos")]
    documents: usize,
}

impl FolderRow {
    /// Build a row for a folder holding `documents` documents.
    pub fn new(folder: &Folder, documents: usize) -> Self {
        Self {
            id: folder.id.to_string(),
            name: folder.name.clone(),
            date: folder.date.format("%Y-%m-%d").to_string(),
            category: folder.category.label().to_string(),
            color: folder.color.to_string(),
            documents,
        }
    }
}

/// Execute folder commands
pub async fn execute(
    args: &FolderArgs,
    ctx: &Context,
    format: OutputFormat,
) -> Result<(), AppError> {
    let store = ctx.open_store(args.scope.scope()).await?;

    match &args.command {
        FolderCommand::List { category } => {
            let folders = match category {
                Some(category) => store.folders_in_category(*category).await,
                None => store.folders().await,
            };
            let snapshot = store.snapshot().await;
            let rows: Vec<FolderRow> = folders
                .iter()
                .map(|f| FolderRow::new(f, snapshot.document_count(f.id)))
                .collect();
            output::print_list(&rows, format);
        }
        FolderCommand::Create {
            name,
            date,
            category,
            color,
        } => {
            let folder = store
                .add_folder(NewFolder {
                    name: name.clone(),
                    date: *date,
                    category: *category,
                    color: *color,
                })
                .await?;
            output::print_item(&FolderRow::new(&folder, 0), format);
        }
        FolderCommand::Update {
            id,
            name,
            date,
            color,
        } => {
            let current = store
                .folder(*id)
                .await
                .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))?;
            let mut patch = FolderPatch::from(&current);
            if let Some(name) = name {
                patch.name = name.clone();
            }
            if let Some(date) = date {
                patch.date = *date;
            }
            if let Some(color) = color {
                patch.color = *color;
            }
            let folder = store.update_folder(*id, patch).await?;
            let count = store.document_count(folder.id).await;
            output::print_item(&FolderRow::new(&folder, count), format);
        }
        FolderCommand::Delete { id } => {
            store.delete_folder(*id).await?;
        }
    }

    Ok(())
}
