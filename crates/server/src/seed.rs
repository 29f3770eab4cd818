//! Seed data for a fresh deployment.
//!
//! The default data set ships with the binary. The CLI can load another file
//! of the same shape.

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::db::{HospitalStore, RepositoryError};
use crate::models::{Medicine, Patient};

const DEFAULT_SEED: &str = include_str!("../seed/hospital.yaml");

/// Errors from loading or applying seed data.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("invalid seed file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}

/// Medicines and patients to load.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub medicines: Vec<Medicine>,
    #[serde(default)]
    pub patients: Vec<Patient>,
}

impl SeedData {
    /// The data set bundled with the server.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Parse` if the bundled file is malformed.
    pub fn bundled() -> Result<Self, SeedError> {
        Self::from_yaml(DEFAULT_SEED)
    }

    /// Parse a YAML document.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Parse` if the document doesn't match the schema.
    pub fn from_yaml(yaml: &str) -> Result<Self, SeedError> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

/// What [`apply`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// Medicines already existed; nothing was written.
    Skipped,
    Seeded { medicines: usize, patients: usize },
}

/// Load `data` into `store` unless it already holds medicines.
///
/// Rows whose code is already taken are skipped.
///
/// # Errors
///
/// Returns `SeedError::Storage` if the store fails.
pub async fn apply(store: &dyn HospitalStore, data: &SeedData) -> Result<SeedOutcome, SeedError> {
    if store.medicine_count().await? > 0 {
        info!("Hospital data already seeded, skipping");
        return Ok(SeedOutcome::Skipped);
    }

    let mut medicines = 0;
    for medicine in &data.medicines {
        match store.insert_medicine(medicine).await {
            Ok(()) => medicines += 1,
            Err(RepositoryError::Conflict(msg)) => warn!(%msg, "Skipping seeded medicine"),
            Err(e) => return Err(e.into()),
        }
    }

    let mut patients = 0;
    for patient in &data.patients {
        match store.insert_patient(patient).await {
            Ok(()) => patients += 1,
            Err(RepositoryError::Conflict(msg)) => warn!(%msg, "Skipping seeded patient"),
            Err(e) => return Err(e.into()),
        }
    }

    info!(medicines, patients, "Hospital data seeded");
    Ok(SeedOutcome::Seeded {
        medicines,
        patients,
    })
}
