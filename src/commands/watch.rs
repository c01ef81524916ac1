//! Follow backend changes for a scope until interrupted.

use secretaria_core::error::AppError;

use super::{Context, ScopeArgs};
use crate::output::OutputFormat;

/// Keep a store in sync with the change feed, then print its summary.
pub async fn execute(
    args: &ScopeArgs,
    ctx: &Context,
    format: OutputFormat,
) -> Result<(), AppError> {
    let store = ctx.open_store(args.scope()).await?;
    let watcher = store.watch().await?;
    println!("Escuchando cambios en {} (Ctrl+C para salir)...", store.scope());

    tokio::signal::ctrl_c().await?;
    watcher.stop();

    super::print_summary(&store, format).await;
    Ok(())
}
