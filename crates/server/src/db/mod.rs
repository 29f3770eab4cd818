//! Persistence gateway for the hospital backend.
//!
//! # Database: `PostgreSQL`, schema `hospital`
//!
//! ## Tables
//!
//! - `medicine` - Medicines and their on-hand stock (`CHECK (stock >= 0)`)
//! - `patient` - Patient roster
//! - `prescription` - Prescription headers
//! - `prescription_item` - Prescription line items (cascade with header)
//! - `stock_log` - Append-only stock movement log
//!
//! ## Sequences
//!
//! - `medicine_code_seq`, `prescription_code_seq`, `patient_code_seq` -
//!   per-entity counters behind generated codes
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p dokterbubung-cli -- migrate
//! ```
//!
//! # Backends
//!
//! Services talk to a [`HospitalStore`]. [`PgStore`] is the production
//! implementation; [`MemoryStore`] keeps everything in process for tests and
//! local demos.

pub mod medicines;
pub mod memory;
pub mod patients;
pub mod prescriptions;
pub mod stock_log;
mod store;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use medicines::MedicineRepository;
pub use memory::MemoryStore;
pub use patients::PatientRepository;
pub use prescriptions::PrescriptionRepository;
pub use stock_log::StockLogRepository;
pub use store::{HospitalStore, PgStore, StockAdjustment};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate code).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Map a unique-violation into [`RepositoryError::Conflict`].
fn conflict_on_unique(err: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(err)
}

/// Whether `err` is `PostgreSQL`'s "integer out of range" (SQLSTATE 22003).
fn is_out_of_range(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("22003"))
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
