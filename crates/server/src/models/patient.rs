//! Patient roster models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use dokterbubung_core::{PatientId, PatientStatus};

/// Allergy note stored when none is given.
pub const NO_ALLERGIES: &str = "-";

/// A registered patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: PatientId,
    pub name: String,
    pub dob: NaiveDate,
    pub status: PatientStatus,
    pub allergies: String,
}

/// Input for adding a patient to the queue.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPatientInput {
    pub name: String,
    pub dob: NaiveDate,
    #[serde(default)]
    pub allergies: Option<String>,
}
