//! Business logic services for the hospital backend.
//!
//! # Services
//!
//! - `inventory` - Medicine records, guarded stock changes and the movement log
//! - `prescriptions` - Prescription lifecycle and dispensing
//! - `patients` - Patient roster
//! - `ids` - Generated codes for all three entity kinds
//! - `cache` - TTL cache for the medicine listing

pub mod cache;
pub mod error;
pub mod ids;
pub mod inventory;
pub mod patients;
pub mod prescriptions;

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

pub use cache::MedicineCache;
pub use error::{HospitalError, HospitalResult};
pub use inventory::InventoryLedger;
pub use patients::PatientRoster;
pub use prescriptions::PrescriptionWorkflow;

use crate::db::HospitalStore;

/// All hospital services wired to one store.
#[derive(Clone)]
pub struct Hospital {
    pub inventory: InventoryLedger,
    pub prescriptions: PrescriptionWorkflow,
    pub patients: PatientRoster,
}

impl Hospital {
    /// Build the services on top of `store`.
    ///
    /// `medicine_cache_ttl` of zero disables the medicine listing cache.
    #[must_use]
    pub fn new(store: Arc<dyn HospitalStore>, medicine_cache_ttl: Duration) -> Self {
        let cache = Arc::new(MedicineCache::new(medicine_cache_ttl));
        debug!(
            enabled = cache.is_enabled(),
            ttl_secs = medicine_cache_ttl.as_secs(),
            "Medicine listing cache"
        );
        let inventory = InventoryLedger::new(Arc::clone(&store), cache);
        let prescriptions = PrescriptionWorkflow::new(Arc::clone(&store), inventory.clone());
        let patients = PatientRoster::new(store);
        Self {
            inventory,
            prescriptions,
            patients,
        }
    }
}
