//! CLI command definitions and dispatch.

pub mod area;
pub mod document;
pub mod folder;
pub mod migrate;
pub mod watch;

use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use secretaria_core::config::{AppConfig, BackendKind};
use secretaria_core::error::AppError;
use secretaria_core::traits::notification::NotificationSink;
use secretaria_core::traits::persistence::PersistenceBackend;
use secretaria_core::traits::upload::UploadProvider;
use secretaria_core::types::{AreaId, UserId};
use secretaria_database::{MemoryBackend, connect_backend};
use secretaria_entity::{ModuleType, Scope};
use secretaria_service::{DocumentStore, MemorySink, RollbackPolicy, TracingSink};
use secretaria_storage::LocalUploadProvider;

use crate::output::{self, OutputFormat};

/// Secretaría de Educación: folders and documents per area and module
#[derive(Debug, Parser)]
#[command(name = "secretaria", version, about, long_about = None)]
pub struct Cli {
    /// Configuration environment overlay (`config/{env}.toml`)
    #[arg(short, long, env = "SECRETARIA_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// User the uploads are attributed to
    #[arg(short, long, env = "SECRETARIA_USER", global = true)]
    pub user: Option<UserId>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Area listing
    Area(area::AreaArgs),
    /// Folder management
    Folder(folder::FolderArgs),
    /// Document management
    Document(document::DocumentArgs),
    /// Search folders and documents of a scope
    Search(SearchArgs),
    /// Folder and document counts per category
    Summary(ScopeArgs),
    /// Follow backend changes for a scope
    Watch(ScopeArgs),
    /// Apply database migrations
    Migrate,
}

/// The `(area, module)` pair a command operates on
#[derive(Debug, Clone, Args)]
pub struct ScopeArgs {
    /// Area ID
    #[arg(short, long)]
    pub area: AreaId,
    /// Module (`proveedores` or `prestacion-servicio`)
    #[arg(short, long, default_value = "proveedores")]
    pub module: ModuleType,
}

impl ScopeArgs {
    /// The scope these arguments name.
    pub fn scope(&self) -> Scope {
        Scope::new(self.area, self.module)
    }
}

/// Arguments for `search`
#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Scope to search in
    #[command(flatten)]
    pub scope: ScopeArgs,
    /// Text to look for
    pub query: String,
}

/// Category summary display row
#[derive(Debug, Serialize, Tabled)]
struct SummaryRow {
    #[tabled(rename = "Categoría")]
    category: String,
    #[tabled(rename = "Carpetas")]
    folders: usize,
    #[tabled(rename = "Documentos")]
    documents: usize,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        if let Commands::Migrate = self.command {
            return migrate::execute(&config).await;
        }

        let ctx = Context::build(config, self.user, self.format).await?;
        let result = match &self.command {
            Commands::Area(args) => area::execute(args, &ctx, self.format).await,
            Commands::Folder(args) => folder::execute(args, &ctx, self.format).await,
            Commands::Document(args) => document::execute(args, &ctx, self.format).await,
            Commands::Search(args) => search(args, &ctx, self.format).await,
            Commands::Summary(args) => summary(args, &ctx, self.format).await,
            Commands::Watch(args) => watch::execute(args, &ctx, self.format).await,
            Commands::Migrate => Ok(()),
        };
        ctx.flush_notifications();
        result?;
        ctx.write_back().await
    }
}

/// Collaborators shared by every command of one invocation.
#[derive(Debug)]
pub struct Context {
    /// Loaded configuration.
    pub config: AppConfig,
    /// Selected persistence backend.
    pub backend: Arc<dyn PersistenceBackend>,
    uploads: Arc<dyn UploadProvider>,
    notifier: Arc<dyn NotificationSink>,
    /// Toasts waiting to be printed. Unset for JSON output, where they are
    /// logged instead so stdout stays machine-readable.
    pending: Option<Arc<MemorySink>>,
    user: Option<UserId>,
    /// Set when in-memory changes are saved back to the fixtures file.
    write_back: Option<(Arc<MemoryBackend>, String)>,
}

impl Context {
    async fn build(
        config: AppConfig,
        user: Option<UserId>,
        format: OutputFormat,
    ) -> Result<Self, AppError> {
        let write_back = match (&config.backend.kind, &config.backend.fixtures) {
            (BackendKind::Memory, Some(path)) if config.backend.write_back => {
                let memory =
                    MemoryBackend::from_fixture_file(path, config.realtime.channel_buffer).await?;
                Some((Arc::new(memory), path.clone()))
            }
            _ => None,
        };
        let backend: Arc<dyn PersistenceBackend> = match &write_back {
            Some((memory, _)) => memory.clone(),
            None => connect_backend(&config).await?,
        };
        let uploads: Arc<dyn UploadProvider> =
            Arc::new(LocalUploadProvider::new(&config.storage).await?);
        let pending = match format {
            OutputFormat::Table => Some(Arc::new(MemorySink::new())),
            OutputFormat::Json => None,
        };
        let notifier: Arc<dyn NotificationSink> = match &pending {
            Some(sink) => sink.clone(),
            None => Arc::new(TracingSink),
        };
        Ok(Self {
            config,
            backend,
            uploads,
            notifier,
            pending,
            user,
            write_back,
        })
    }

    async fn write_back(&self) -> Result<(), AppError> {
        if let Some((memory, path)) = &self.write_back {
            memory.save_fixture_file(path).await?;
        }
        Ok(())
    }

    /// Open and load the store for a scope.
    pub async fn open_store(&self, scope: Scope) -> Result<Arc<DocumentStore>, AppError> {
        let mut store = DocumentStore::new(
            scope,
            self.backend.clone(),
            self.uploads.clone(),
            self.notifier.clone(),
        )
        .with_policy(RollbackPolicy::from_config(&self.config.store));
        if let Some(user) = self.user {
            store = store.with_user(user);
        }
        store.load().await?;
        Ok(Arc::new(store))
    }

    /// Print and clear the notifications raised so far.
    pub fn flush_notifications(&self) {
        let Some(sink) = &self.pending else {
            return;
        };
        for notification in sink.take() {
            output::print_notification(&notification);
        }
    }
}

async fn search(args: &SearchArgs, ctx: &Context, format: OutputFormat) -> Result<(), AppError> {
    let store = ctx.open_store(args.scope.scope()).await?;
    let hits = store.search(&args.query).await;
    let snapshot = store.snapshot().await;

    println!("Carpetas:");
    let folders: Vec<folder::FolderRow> = hits
        .folders
        .iter()
        .map(|f| folder::FolderRow::new(f, snapshot.document_count(f.id)))
        .collect();
    output::print_list(&folders, format);

    println!("Documentos:");
    let documents: Vec<document::DocumentRow> =
        hits.documents.iter().map(document::DocumentRow::from).collect();
    output::print_list(&documents, format);
    Ok(())
}

async fn summary(args: &ScopeArgs, ctx: &Context, format: OutputFormat) -> Result<(), AppError> {
    let store = ctx.open_store(args.scope()).await?;
    print_summary(&store, format).await;
    Ok(())
}

/// Print the per-category counts of a store.
pub async fn print_summary(store: &DocumentStore, format: OutputFormat) {
    let rows: Vec<SummaryRow> = store
        .category_summary()
        .await
        .into_iter()
        .map(|s| SummaryRow {
            category: s.category.label().to_string(),
            folders: s.folders,
            documents: s.documents,
        })
        .collect();
    output::print_list(&rows, format);
}
