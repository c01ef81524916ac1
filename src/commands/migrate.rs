//! Database migration command.

use tracing::info;

use secretaria_core::config::{AppConfig, BackendKind};
use secretaria_core::error::AppError;
use secretaria_database::DatabasePool;
use secretaria_database::migration::run_migrations;

use crate::output;

/// Apply pending migrations to the configured PostgreSQL database.
pub async fn execute(config: &AppConfig) -> Result<(), AppError> {
    if config.backend.kind != BackendKind::Postgres {
        return Err(AppError::configuration(
            "Migrations require backend.kind = \"postgres\"",
        ));
    }
    let pool = DatabasePool::connect(&config.database).await?;
    run_migrations(pool.pool()).await?;
    info!("Database migrations complete");
    output::print_success("Migraciones aplicadas");
    Ok(())
}
