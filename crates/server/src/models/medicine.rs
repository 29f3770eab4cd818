//! Medicine domain models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use dokterbubung_core::{MedicineId, Price};

/// A medicine held in the pharmacy store room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medicine {
    /// Medicine code (e.g. `OBT0001`).
    pub id: MedicineId,
    /// Display name including strength (e.g. "Amoxicillin 500mg").
    pub name: String,
    /// Dosage form (Tablet, Sirup, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Units on hand. Never negative.
    pub stock: i32,
    /// Unit price.
    pub price: Price,
    /// Expiry date of the batch on the shelf.
    pub expiry: NaiveDate,
    /// Shelf location (e.g. "Rak A1").
    pub location: String,
}

/// Input for registering a new medicine.
///
/// The code is optional; one is generated when it is missing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMedicineInput {
    #[serde(default)]
    pub id: Option<MedicineId>,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub stock: i32,
    pub price: Price,
    pub expiry: NaiveDate,
    #[serde(default)]
    pub location: String,
}

impl CreateMedicineInput {
    /// Build the medicine record under the given code.
    #[must_use]
    pub fn into_medicine(self, id: MedicineId) -> Medicine {
        Medicine {
            id,
            name: self.name,
            kind: self.kind,
            stock: self.stock,
            price: self.price,
            expiry: self.expiry,
            location: self.location,
        }
    }
}
