//! Prescription workflow: `Pending` -> `Process` -> `Selesai`.
//!
//! Writing a prescription never touches stock. Stock is dispensed when the
//! pharmacy processes it, one item at a time in the order written. A failure
//! partway through keeps the items already dispensed (and their log entries)
//! and leaves the prescription `Pending`.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};

use dokterbubung_core::{CodeKind, MovementType, PrescriptionId, PrescriptionStatus, Price};

use super::error::{HospitalError, HospitalResult};
use super::ids::CodeAttempts;
use super::inventory::InventoryLedger;
use crate::db::{HospitalStore, RepositoryError};
use crate::models::patient::NO_ALLERGIES;
use crate::models::stock_log::DISPENSE_PIC;
use crate::models::{
    CreatePrescriptionInput, NewStockLog, Prescription, PrescriptionItem, PrescriptionItemInput,
};

/// Workflow action accepted by [`PrescriptionWorkflow::advance`].
pub const ACTION_PROCESS: &str = "process";
/// Workflow action accepted by [`PrescriptionWorkflow::advance`].
pub const ACTION_FINISH: &str = "finish";

/// Drives prescriptions through their lifecycle.
#[derive(Clone)]
pub struct PrescriptionWorkflow {
    store: Arc<dyn HospitalStore>,
    inventory: InventoryLedger,
}

impl PrescriptionWorkflow {
    #[must_use]
    pub fn new(store: Arc<dyn HospitalStore>, inventory: InventoryLedger) -> Self {
        Self { store, inventory }
    }

    /// All prescriptions with items, newest first.
    ///
    /// # Errors
    ///
    /// Returns `HospitalError::Storage` if the store fails.
    pub async fn list(&self) -> HospitalResult<Vec<Prescription>> {
        Ok(self.store.list_prescriptions().await?)
    }

    /// One prescription with its items.
    ///
    /// # Errors
    ///
    /// Returns `HospitalError::NotFound` if the code is unknown.
    pub async fn get(&self, id: &PrescriptionId) -> HospitalResult<Prescription> {
        self.store
            .get_prescription(id)
            .await?
            .ok_or_else(|| HospitalError::NotFound(format!("prescription {id}")))
    }

    /// Write a new `Pending` prescription.
    ///
    /// Medicine codes, names and prices are stored as given. They are checked
    /// against the inventory only when the prescription is processed.
    ///
    /// # Errors
    ///
    /// Returns `HospitalError::InvalidInput` if the patient or doctor is
    /// missing, there are no items, or an item has a non-positive quantity or
    /// negative price.
    #[instrument(skip(self, input), fields(doctor = %input.doctor_name, items = input.items.len()))]
    pub async fn create(&self, input: CreatePrescriptionInput) -> HospitalResult<Prescription> {
        validate(&input)?;

        let allergies = match input.allergies.trim() {
            "" => NO_ALLERGIES.to_string(),
            other => other.to_string(),
        };
        let lines = input
            .items
            .iter()
            .map(PrescriptionItemInput::line_total)
            .collect::<Result<Vec<_>, _>>()?;
        let total_price = Price::total(lines)?;
        let now = Utc::now();

        let mut attempts = CodeAttempts::new(self.store.as_ref(), CodeKind::Prescription);
        while let Some(code) = attempts.next_code().await? {
            let id = PrescriptionId::new(code);
            let prescription = Prescription {
                id: id.clone(),
                patient_name: input.patient_name.trim().to_string(),
                patient_dob: input.patient_dob,
                allergies: allergies.clone(),
                doctor_name: input.doctor_name.trim().to_string(),
                date: now.date_naive(),
                status: PrescriptionStatus::Pending,
                total_price,
                items: input
                    .items
                    .iter()
                    .map(|item| PrescriptionItem {
                        prescription_id: id.clone(),
                        medicine_id: item.medicine_id.clone(),
                        name: item.name.clone(),
                        qty: item.qty,
                        price: item.price,
                        signa: item.signa.clone(),
                    })
                    .collect(),
                created_at: now,
            };

            match self.store.insert_prescription(&prescription).await {
                Ok(()) => {
                    info!(
                        prescription_id = %prescription.id,
                        total = %prescription.total_price.display(),
                        "Prescription written"
                    );
                    return Ok(prescription);
                }
                Err(RepositoryError::Conflict(_)) => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(HospitalError::Conflict(format!(
            "could not allocate a prescription code after {} attempts",
            attempts.attempts()
        )))
    }

    /// Dispense every item and move the prescription to `Process`.
    ///
    /// # Errors
    ///
    /// - `HospitalError::NotFound` if the prescription or an item's medicine
    ///   is unknown
    /// - `HospitalError::InvalidTransition` unless the prescription is `Pending`
    /// - `HospitalError::InsufficientStock` naming the first item that can't
    ///   be filled; earlier items stay dispensed
    #[instrument(skip(self), fields(prescription_id = %id))]
    pub async fn process(&self, id: &PrescriptionId) -> HospitalResult<()> {
        let prescription = self.get(id).await?;
        require_status(&prescription, PrescriptionStatus::Process)?;

        for item in &prescription.items {
            self.dispense(&prescription.id, item).await?;
        }

        self.transition(&prescription, PrescriptionStatus::Process)
            .await
    }

    /// Mark a processed prescription as picked up.
    ///
    /// # Errors
    ///
    /// Returns `HospitalError::NotFound` if the prescription is unknown and
    /// `HospitalError::InvalidTransition` unless it is in `Process`.
    #[instrument(skip(self), fields(prescription_id = %id))]
    pub async fn finish(&self, id: &PrescriptionId) -> HospitalResult<()> {
        let prescription = self.get(id).await?;
        require_status(&prescription, PrescriptionStatus::Selesai)?;
        self.transition(&prescription, PrescriptionStatus::Selesai)
            .await
    }

    /// Run the named workflow action and return the resulting status.
    ///
    /// # Errors
    ///
    /// Returns `HospitalError::InvalidAction` for anything other than
    /// `process` or `finish`, otherwise whatever that action returns.
    pub async fn advance(
        &self,
        id: &PrescriptionId,
        action: &str,
    ) -> HospitalResult<PrescriptionStatus> {
        match action {
            ACTION_PROCESS => {
                self.process(id).await?;
                Ok(PrescriptionStatus::Process)
            }
            ACTION_FINISH => {
                self.finish(id).await?;
                Ok(PrescriptionStatus::Selesai)
            }
            other => Err(HospitalError::InvalidAction(other.to_string())),
        }
    }

    async fn dispense(&self, id: &PrescriptionId, item: &PrescriptionItem) -> HospitalResult<()> {
        let medicine = self.inventory.get_medicine(&item.medicine_id).await?;
        if medicine.stock < item.qty {
            return Err(HospitalError::InsufficientStock {
                item: item.name.clone(),
                requested: item.qty,
                available: medicine.stock,
            });
        }

        // The ledger's guarded update catches a concurrent dispense that
        // drained the stock after the check above.
        self.inventory
            .adjust_stock(&item.medicine_id, -item.qty)
            .await
            .map_err(|e| match e {
                HospitalError::InsufficientStock {
                    requested,
                    available,
                    ..
                } => HospitalError::InsufficientStock {
                    item: item.name.clone(),
                    requested,
                    available,
                },
                other => other,
            })?;

        self.inventory
            .record_movement(NewStockLog {
                movement: MovementType::Out,
                medicine_name: item.name.clone(),
                qty: item.qty,
                reference: id.to_string(),
                pic: DISPENSE_PIC.to_string(),
            })
            .await?;
        Ok(())
    }

    async fn transition(
        &self,
        prescription: &Prescription,
        to: PrescriptionStatus,
    ) -> HospitalResult<()> {
        let from = prescription.status;
        if self
            .store
            .transition_prescription(&prescription.id, from, to)
            .await?
        {
            info!(prescription_id = %prescription.id, %from, %to, "Prescription status changed");
            return Ok(());
        }

        // Someone else moved it between our read and the update.
        warn!(prescription_id = %prescription.id, %from, %to, "Lost status race");
        let current = self.get(&prescription.id).await?.status;
        Err(HospitalError::InvalidTransition { from: current, to })
    }
}

fn require_status(prescription: &Prescription, to: PrescriptionStatus) -> HospitalResult<()> {
    if prescription.status.can_advance_to(to) {
        Ok(())
    } else {
        Err(HospitalError::InvalidTransition {
            from: prescription.status,
            to,
        })
    }
}

fn validate(input: &CreatePrescriptionInput) -> HospitalResult<()> {
    if input.patient_name.trim().is_empty() {
        return Err(HospitalError::InvalidInput("patientName is required".into()));
    }
    if input.doctor_name.trim().is_empty() {
        return Err(HospitalError::InvalidInput("doctorName is required".into()));
    }
    if input.items.is_empty() {
        return Err(HospitalError::InvalidInput(
            "a prescription needs at least one item".into(),
        ));
    }
    for item in &input.items {
        if item.qty <= 0 {
            return Err(HospitalError::InvalidInput(format!(
                "qty for {} must be greater than zero",
                item.medicine_id
            )));
        }
        if item.price.is_negative() {
            return Err(HospitalError::InvalidInput(format!(
                "price for {} must not be negative",
                item.medicine_id
            )));
        }
        if item.price.storable().is_err() {
            return Err(HospitalError::InvalidInput(format!(
                "price for {} exceeds {}",
                item.medicine_id,
                Price::MAX.display()
            )));
        }
    }
    Ok(())
}
