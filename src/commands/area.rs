//! Area listing.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use secretaria_core::error::AppError;
use secretaria_core::types::{Filters, Table};
use secretaria_entity::Area;
use secretaria_entity::record::from_records;

use super::Context;
use crate::output::{self, OutputFormat};

/// Arguments for area commands
#[derive(Debug, Args)]
pub struct AreaArgs {
    /// Area subcommand
    #[command(subcommand)]
    pub command: AreaCommand,
}

/// Area subcommands
#[derive(Debug, Subcommand)]
pub enum AreaCommand {
    /// List every area
    List,
}

/// Area display row
#[derive(Debug, Serialize, Tabled)]
struct AreaRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Nombre")]
    name: String,
    #[tabled(rename = "Descripción")]
    description: String,
}

/// Execute area commands
pub async fn execute(args: &AreaArgs, ctx: &Context, format: OutputFormat) -> Result<(), AppError> {
    match &args.command {
        AreaCommand::List => {
            let areas: Vec<Area> =
                from_records(ctx.backend.read(Table::Areas, &Filters::new()).await?)?;
            let rows: Vec<AreaRow> = areas
                .into_iter()
                .map(|a| AreaRow {
                    id: a.id.to_string(),
                    name: a.name,
                    description: a.description.unwrap_or_default(),
                })
                .collect();
            output::print_list(&rows, format);
        }
    }
    Ok(())
}
