//! Patient roster.

use std::sync::Arc;

use tracing::{info, instrument};

use dokterbubung_core::{CodeKind, PatientId, PatientStatus};

use super::error::{HospitalError, HospitalResult};
use super::ids::CodeAttempts;
use crate::db::{HospitalStore, RepositoryError};
use crate::models::patient::NO_ALLERGIES;
use crate::models::{AddPatientInput, Patient};

/// Registry of patients waiting for or in examination.
#[derive(Clone)]
pub struct PatientRoster {
    store: Arc<dyn HospitalStore>,
}

impl PatientRoster {
    #[must_use]
    pub fn new(store: Arc<dyn HospitalStore>) -> Self {
        Self { store }
    }

    /// All patients ordered by code.
    ///
    /// # Errors
    ///
    /// Returns `HospitalError::Storage` if the store fails.
    pub async fn list(&self) -> HospitalResult<Vec<Patient>> {
        Ok(self.store.list_patients().await?)
    }

    /// Add a patient to the waiting queue.
    ///
    /// # Errors
    ///
    /// Returns `HospitalError::InvalidInput` if the name is empty.
    #[instrument(skip(self, input))]
    pub async fn add(&self, input: AddPatientInput) -> HospitalResult<Patient> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(HospitalError::InvalidInput("patient name is required".into()));
        }
        let allergies = input
            .allergies
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .unwrap_or(NO_ALLERGIES);

        let mut attempts = CodeAttempts::new(self.store.as_ref(), CodeKind::Patient);
        while let Some(code) = attempts.next_code().await? {
            let patient = Patient {
                id: PatientId::new(code),
                name: name.to_string(),
                dob: input.dob,
                status: PatientStatus::Waiting,
                allergies: allergies.to_string(),
            };
            match self.store.insert_patient(&patient).await {
                Ok(()) => {
                    info!(patient_id = %patient.id, "Patient queued");
                    return Ok(patient);
                }
                Err(RepositoryError::Conflict(_)) => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(HospitalError::Conflict(format!(
            "could not allocate a patient code after {} attempts",
            attempts.attempts()
        )))
    }

    /// Remove a patient. Removing an unknown code is not an error.
    ///
    /// Returns whether a patient was actually removed.
    ///
    /// # Errors
    ///
    /// Returns `HospitalError::Storage` if the store fails.
    #[instrument(skip(self))]
    pub async fn remove(&self, id: &PatientId) -> HospitalResult<bool> {
        let removed = self.store.delete_patient(id).await?;
        info!(patient_id = %id, removed, "Patient removed");
        Ok(removed)
    }
}
