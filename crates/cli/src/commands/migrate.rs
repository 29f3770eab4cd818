//! Database migration command.
//!
//! Migrations live in `crates/server/migrations/` and are embedded at
//! compile time.

use dokterbubung_server::db;

use super::{CliError, database_url};

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns `CliError` if the database URL is missing, the connection fails
/// or a migration fails.
pub async fn run() -> Result<(), CliError> {
    let database_url = database_url()?;

    tracing::info!("Connecting to hospital database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Running hospital migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Hospital migrations complete!");
    Ok(())
}
