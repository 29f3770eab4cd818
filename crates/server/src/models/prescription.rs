//! Prescription domain models.
//!
//! A prescription is a snapshot: patient details, medicine names and unit
//! prices are copied in when the doctor writes it and are never refreshed
//! from the live patient or medicine records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use dokterbubung_core::{MedicineId, PrescriptionId, PrescriptionStatus, Price, PriceError};

/// A prescription with its ordered line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    /// Prescription code (e.g. `RSP-0001`).
    pub id: PrescriptionId,
    /// Patient name at the time of writing.
    pub patient_name: String,
    /// Patient date of birth at the time of writing.
    pub patient_dob: NaiveDate,
    /// Allergy notes at the time of writing.
    pub allergies: String,
    /// Prescribing doctor.
    pub doctor_name: String,
    /// Date the prescription was written.
    pub date: NaiveDate,
    /// Lifecycle status.
    pub status: PrescriptionStatus,
    /// Sum of `qty * price` over the items, frozen at creation.
    pub total_price: Price,
    /// Line items in the order the doctor wrote them.
    pub items: Vec<PrescriptionItem>,
    /// When the prescription was stored.
    pub created_at: DateTime<Utc>,
}

/// One medicine line on a prescription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionItem {
    /// Owning prescription.
    pub prescription_id: PrescriptionId,
    /// Medicine to dispense. Not checked until dispense time.
    pub medicine_id: MedicineId,
    /// Medicine name snapshot.
    pub name: String,
    /// Units to dispense.
    pub qty: i32,
    /// Unit price snapshot.
    pub price: Price,
    /// Dosage instructions.
    pub signa: String,
}

/// Input for one line of a new prescription.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionItemInput {
    pub medicine_id: MedicineId,
    #[serde(default)]
    pub name: String,
    pub qty: i32,
    pub price: Price,
    #[serde(default)]
    pub signa: String,
}

impl PrescriptionItemInput {
    /// `qty * price` for this line.
    ///
    /// # Errors
    ///
    /// Returns `PriceError` if the product overflows or won't fit storage.
    pub fn line_total(&self) -> Result<Price, PriceError> {
        self.price.times(self.qty)
    }
}

/// Input for writing a new prescription.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePrescriptionInput {
    pub patient_name: String,
    pub patient_dob: NaiveDate,
    #[serde(default)]
    pub allergies: String,
    pub doctor_name: String,
    pub items: Vec<PrescriptionItemInput>,
}
