//! Domain models for the hospital backend.
//!
//! JSON field names are camelCase, matching what the clinic frontend sends
//! and expects.

pub mod medicine;
pub mod patient;
pub mod prescription;
pub mod stock_log;

pub use medicine::{CreateMedicineInput, Medicine};
pub use patient::{AddPatientInput, Patient};
pub use prescription::{
    CreatePrescriptionInput, Prescription, PrescriptionItem, PrescriptionItemInput,
};
pub use stock_log::{NewStockLog, StockLog};
