//! Seed command.
//!
//! Loads medicines and patients into an empty database. A database that
//! already holds medicines is left untouched.

use std::path::Path;

use tracing::info;

use dokterbubung_server::db::{self, PgStore};
use dokterbubung_server::seed::{self, SeedData, SeedOutcome};

use super::{CliError, database_url};

/// Seed from `file`, or from the bundled data set when `None`.
///
/// # Errors
///
/// Returns `CliError` if the file can't be read or parsed, or the database
/// fails.
pub async fn run(file: Option<&Path>) -> Result<(), CliError> {
    // Parse before connecting so a bad file fails fast
    let data = match file {
        Some(path) => {
            info!(path = %path.display(), "Loading seed data from file");
            let content = tokio::fs::read_to_string(path)
                .await
                .map_err(|source| CliError::Io {
                    path: path.display().to_string(),
                    source,
                })?;
            SeedData::from_yaml(&content)?
        }
        None => SeedData::bundled()?,
    };

    info!(
        medicines = data.medicines.len(),
        patients = data.patients.len(),
        "Parsed seed data"
    );

    let pool = db::create_pool(&database_url()?).await?;
    let store = PgStore::new(pool);

    match seed::apply(&store, &data).await? {
        SeedOutcome::Skipped => info!("Database already has medicines; nothing seeded"),
        SeedOutcome::Seeded {
            medicines,
            patients,
        } => info!(medicines, patients, "Seeding complete"),
    }

    Ok(())
}
