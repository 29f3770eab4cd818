//! Inventory ledger: medicines, stock levels and the movement log.

use std::sync::Arc;

use tracing::{info, instrument};

use dokterbubung_core::{CodeKind, MedicineId, MovementType};

use super::cache::MedicineCache;
use super::error::{HospitalError, HospitalResult};
use super::ids::CodeAttempts;
use crate::db::{HospitalStore, RepositoryError, StockAdjustment};
use crate::models::stock_log::RESTOCK_REF;
use crate::models::{CreateMedicineInput, Medicine, NewStockLog, StockLog};

/// Log entries returned when no limit is given.
pub const DEFAULT_LOG_LIMIT: i64 = 100;

/// Upper bound on log entries per request.
pub const MAX_LOG_LIMIT: i64 = 500;

/// Owns medicine records and the append-only stock log.
#[derive(Clone)]
pub struct InventoryLedger {
    store: Arc<dyn HospitalStore>,
    cache: Arc<MedicineCache>,
}

impl InventoryLedger {
    #[must_use]
    pub fn new(store: Arc<dyn HospitalStore>, cache: Arc<MedicineCache>) -> Self {
        Self { store, cache }
    }

    /// All medicines ordered by code.
    ///
    /// # Errors
    ///
    /// Returns `HospitalError::Storage` if the store fails.
    pub async fn list_medicines(&self) -> HospitalResult<Vec<Medicine>> {
        let medicines = self
            .cache
            .get_or_load(|| self.store.list_medicines())
            .await?;
        Ok(medicines.as_ref().clone())
    }

    /// Look up one medicine, bypassing the listing cache.
    ///
    /// # Errors
    ///
    /// Returns `HospitalError::NotFound` if no medicine has this code.
    pub async fn get_medicine(&self, id: &MedicineId) -> HospitalResult<Medicine> {
        self.store
            .get_medicine(id)
            .await?
            .ok_or_else(|| HospitalError::NotFound(format!("medicine {id}")))
    }

    /// Register a medicine, generating a code when none is supplied.
    ///
    /// # Errors
    ///
    /// Returns `HospitalError::InvalidInput` for an empty name, negative
    /// stock, or a price that is negative or above [`dokterbubung_core::Price::MAX`], and
    /// `HospitalError::Conflict` if a supplied code is already taken.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_medicine(&self, mut input: CreateMedicineInput) -> HospitalResult<Medicine> {
        input.name = input.name.trim().to_string();
        if input.name.is_empty() {
            return Err(HospitalError::InvalidInput("medicine name is required".into()));
        }
        if input.stock < 0 {
            return Err(HospitalError::InvalidInput("stock must not be negative".into()));
        }
        if input.price.is_negative() {
            return Err(HospitalError::InvalidInput("price must not be negative".into()));
        }
        input.price.storable()?;

        let medicine = match input.id.take() {
            Some(id) if !id.as_str().trim().is_empty() => {
                let medicine = input.into_medicine(id);
                self.store.insert_medicine(&medicine).await?;
                medicine
            }
            _ => self.insert_with_generated_code(input).await?,
        };

        self.cache.invalidate().await;
        info!(medicine_id = %medicine.id, stock = medicine.stock, "Medicine registered");
        Ok(medicine)
    }

    async fn insert_with_generated_code(
        &self,
        input: CreateMedicineInput,
    ) -> HospitalResult<Medicine> {
        let mut attempts = CodeAttempts::new(self.store.as_ref(), CodeKind::Medicine);
        while let Some(code) = attempts.next_code().await? {
            let medicine = input.clone().into_medicine(MedicineId::new(code));
            match self.store.insert_medicine(&medicine).await {
                Ok(()) => return Ok(medicine),
                Err(RepositoryError::Conflict(_)) => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(HospitalError::Conflict(format!(
            "could not allocate a medicine code after {} attempts",
            attempts.attempts()
        )))
    }

    /// Add `delta` to a medicine's stock without going below zero.
    ///
    /// Returns the new stock level.
    ///
    /// # Errors
    ///
    /// Returns `HospitalError::NotFound` for an unknown code and
    /// `HospitalError::InsufficientStock` if the result would be negative.
    /// Returns `HospitalError::InvalidInput` if the result would overflow.
    #[instrument(skip(self))]
    pub async fn adjust_stock(&self, id: &MedicineId, delta: i32) -> HospitalResult<i32> {
        let outcome = match self.store.adjust_stock(id, delta).await {
            Ok(outcome) => outcome,
            Err(RepositoryError::NotFound) => {
                return Err(HospitalError::NotFound(format!("medicine {id}")));
            }
            Err(e) => return Err(e.into()),
        };

        match outcome {
            StockAdjustment::Applied { stock } => {
                self.cache.invalidate().await;
                Ok(stock)
            }
            StockAdjustment::Insufficient { available } => Err(HospitalError::InsufficientStock {
                item: id.to_string(),
                requested: delta.saturating_neg(),
                available,
            }),
            StockAdjustment::Overflow { available } => Err(HospitalError::InvalidInput(format!(
                "adding {delta} to stock {available} of {id} would overflow"
            ))),
        }
    }

    /// Receive `amount` units into stock and log an IN movement.
    ///
    /// The stock change is kept even if the log append fails; the log error
    /// is still returned.
    ///
    /// # Errors
    ///
    /// Returns `HospitalError::InvalidInput` unless `amount > 0`,
    /// `HospitalError::NotFound` for an unknown code, or
    /// `HospitalError::Storage` if the store fails.
    #[instrument(skip(self))]
    pub async fn restock(
        &self,
        id: &MedicineId,
        amount: i32,
        performed_by: &str,
    ) -> HospitalResult<i32> {
        if amount <= 0 {
            return Err(HospitalError::InvalidInput(
                "restock amount must be greater than zero".into(),
            ));
        }

        let medicine = self.get_medicine(id).await?;
        if medicine.stock.checked_add(amount).is_none() {
            return Err(HospitalError::InvalidInput(format!(
                "restock of {amount} would overflow stock for {id}"
            )));
        }
        let stock = self.adjust_stock(id, amount).await?;

        self.record_movement(NewStockLog {
            movement: MovementType::In,
            medicine_name: medicine.name,
            qty: amount,
            reference: RESTOCK_REF.to_string(),
            pic: performed_by.to_string(),
        })
        .await?;

        Ok(stock)
    }

    /// Append a stock movement to the log.
    ///
    /// # Errors
    ///
    /// Returns `HospitalError::Storage` if the append fails.
    pub async fn record_movement(&self, entry: NewStockLog) -> HospitalResult<StockLog> {
        let log = self.store.append_log(&entry).await?;
        info!(
            movement = %log.movement,
            medicine = %log.medicine_name,
            qty = log.qty,
            reference = %log.reference,
            pic = %log.pic,
            "Stock movement"
        );
        Ok(log)
    }

    /// Most recent movements, newest first.
    ///
    /// `limit` defaults to [`DEFAULT_LOG_LIMIT`] and is clamped to
    /// `1..=MAX_LOG_LIMIT`.
    ///
    /// # Errors
    ///
    /// Returns `HospitalError::Storage` if the store fails.
    pub async fn list_logs(&self, limit: Option<i64>) -> HospitalResult<Vec<StockLog>> {
        let limit = limit.unwrap_or(DEFAULT_LOG_LIMIT).clamp(1, MAX_LOG_LIMIT);
        Ok(self.store.list_logs(limit).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::collections::HashSet;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use dokterbubung_core::{PatientId, Price, PrescriptionId, PrescriptionStatus};
    use futures::future::join_all;
    use rust_decimal::Decimal;

    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{Patient, Prescription};

    /// Delegates to a [`MemoryStore`] but refuses every log append.
    struct FailingLogStore(MemoryStore);

    #[async_trait]
    impl HospitalStore for FailingLogStore {
        async fn next_code_value(&self, kind: CodeKind) -> Result<i64, RepositoryError> {
            self.0.next_code_value(kind).await
        }
        async fn list_medicines(&self) -> Result<Vec<Medicine>, RepositoryError> {
            self.0.list_medicines().await
        }
        async fn get_medicine(&self, id: &MedicineId) -> Result<Option<Medicine>, RepositoryError> {
            self.0.get_medicine(id).await
        }
        async fn insert_medicine(&self, medicine: &Medicine) -> Result<(), RepositoryError> {
            self.0.insert_medicine(medicine).await
        }
        async fn adjust_stock(
            &self,
            id: &MedicineId,
            delta: i32,
        ) -> Result<StockAdjustment, RepositoryError> {
            self.0.adjust_stock(id, delta).await
        }
        async fn medicine_count(&self) -> Result<i64, RepositoryError> {
            self.0.medicine_count().await
        }
        async fn list_prescriptions(&self) -> Result<Vec<Prescription>, RepositoryError> {
            self.0.list_prescriptions().await
        }
        async fn get_prescription(
            &self,
            id: &PrescriptionId,
        ) -> Result<Option<Prescription>, RepositoryError> {
            self.0.get_prescription(id).await
        }
        async fn insert_prescription(
            &self,
            prescription: &Prescription,
        ) -> Result<(), RepositoryError> {
            self.0.insert_prescription(prescription).await
        }
        async fn transition_prescription(
            &self,
            id: &PrescriptionId,
            from: PrescriptionStatus,
            to: PrescriptionStatus,
        ) -> Result<bool, RepositoryError> {
            self.0.transition_prescription(id, from, to).await
        }
        async fn list_patients(&self) -> Result<Vec<Patient>, RepositoryError> {
            self.0.list_patients().await
        }
        async fn insert_patient(&self, patient: &Patient) -> Result<(), RepositoryError> {
            self.0.insert_patient(patient).await
        }
        async fn delete_patient(&self, id: &PatientId) -> Result<bool, RepositoryError> {
            self.0.delete_patient(id).await
        }
        async fn append_log(&self, _entry: &NewStockLog) -> Result<StockLog, RepositoryError> {
            Err(RepositoryError::DataCorruption("log unavailable".into()))
        }
        async fn list_logs(&self, limit: i64) -> Result<Vec<StockLog>, RepositoryError> {
            self.0.list_logs(limit).await
        }
        async fn ping(&self) -> Result<(), RepositoryError> {
            self.0.ping().await
        }
    }

    fn ledger(cache_ttl: Duration) -> InventoryLedger {
        InventoryLedger::new(
            Arc::new(MemoryStore::new()),
            Arc::new(MedicineCache::new(cache_ttl)),
        )
    }

    fn input(id: Option<&str>, name: &str, stock: i32) -> CreateMedicineInput {
        CreateMedicineInput {
            id: id.map(MedicineId::new),
            name: name.to_string(),
            kind: "Tablet".to_string(),
            stock,
            price: Price::from_rupiah(5_000),
            expiry: NaiveDate::from_ymd_opt(2027, 1, 15).unwrap(),
            location: "Rak A2".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_generates_sequential_codes() {
        let ledger = ledger(Duration::ZERO);
        let first = ledger.create_medicine(input(None, "Paracetamol 500mg", 10)).await.unwrap();
        let second = ledger.create_medicine(input(None, "Ibuprofen 400mg", 10)).await.unwrap();

        assert_eq!(first.id.as_str(), "OBT0001");
        assert_eq!(second.id.as_str(), "OBT0002");
    }

    #[tokio::test]
    async fn test_generated_code_skips_taken_codes() {
        let ledger = ledger(Duration::ZERO);
        ledger
            .create_medicine(input(Some("OBT0001"), "Amoxicillin 500mg", 5))
            .await
            .unwrap();

        let generated = ledger.create_medicine(input(None, "Vitamin C 1000mg", 5)).await.unwrap();
        assert_eq!(generated.id.as_str(), "OBT0002");
    }

    #[tokio::test]
    async fn test_create_rejects_bad_input() {
        let ledger = ledger(Duration::ZERO);

        let err = ledger.create_medicine(input(None, "  ", 1)).await.unwrap_err();
        assert!(matches!(err, HospitalError::InvalidInput(_)));

        let err = ledger.create_medicine(input(None, "Paracetamol", -1)).await.unwrap_err();
        assert!(matches!(err, HospitalError::InvalidInput(_)));

        ledger.create_medicine(input(Some("OBT001"), "Paracetamol", 1)).await.unwrap();
        let err = ledger
            .create_medicine(input(Some("OBT001"), "Paracetamol", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, HospitalError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_adjust_stock_never_goes_negative() {
        let ledger = ledger(Duration::ZERO);
        let medicine = ledger.create_medicine(input(None, "Simvastatin 10mg", 5)).await.unwrap();

        let err = ledger.adjust_stock(&medicine.id, -6).await.unwrap_err();
        assert!(matches!(
            err,
            HospitalError::InsufficientStock { requested: 6, available: 5, .. }
        ));
        assert_eq!(ledger.get_medicine(&medicine.id).await.unwrap().stock, 5);

        assert_eq!(ledger.adjust_stock(&medicine.id, -5).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_restock_logs_in_movement() {
        let ledger = ledger(Duration::ZERO);
        let medicine = ledger.create_medicine(input(None, "OBH Combi Anak", 8)).await.unwrap();

        let stock = ledger.restock(&medicine.id, 12, "Staff Gudang").await.unwrap();
        assert_eq!(stock, 20);

        let logs = ledger.list_logs(None).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].movement, MovementType::In);
        assert_eq!(logs[0].qty, 12);
        assert_eq!(logs[0].reference, "Restock");
        assert_eq!(logs[0].pic, "Staff Gudang");
        assert_eq!(logs[0].medicine_name, "OBH Combi Anak");
    }

    #[tokio::test]
    async fn test_restock_rejects_non_positive_and_unknown() {
        let ledger = ledger(Duration::ZERO);
        let medicine = ledger.create_medicine(input(None, "Vitamin C", 1)).await.unwrap();

        let err = ledger.restock(&medicine.id, 0, "Staff Gudang").await.unwrap_err();
        assert!(matches!(err, HospitalError::InvalidInput(_)));

        let err = ledger
            .restock(&MedicineId::new("OBT9999"), 5, "Staff Gudang")
            .await
            .unwrap_err();
        assert!(matches!(err, HospitalError::NotFound(_)));
        assert!(ledger.list_logs(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_listing_reflects_restock_with_cache_enabled() {
        let ledger = ledger(Duration::from_secs(300));
        let medicine = ledger.create_medicine(input(None, "Paracetamol", 10)).await.unwrap();

        assert_eq!(ledger.list_medicines().await.unwrap()[0].stock, 10);
        ledger.restock(&medicine.id, 5, "Staff Gudang").await.unwrap();
        assert_eq!(ledger.list_medicines().await.unwrap()[0].stock, 15);
    }

    #[tokio::test]
    async fn test_create_rejects_unstorable_price() {
        let ledger = ledger(Duration::ZERO);
        let mut too_big = input(None, "Paracetamol", 1);
        too_big.price = Price::new(Decimal::MAX);

        let err = ledger.create_medicine(too_big).await.unwrap_err();
        assert!(matches!(err, HospitalError::InvalidInput(_)));
        assert!(ledger.list_medicines().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_restock_overflow_is_invalid_input() {
        let ledger = ledger(Duration::ZERO);
        let medicine = ledger.create_medicine(input(None, "Paracetamol", 5)).await.unwrap();

        let err = ledger
            .restock(&medicine.id, i32::MAX, "Staff Gudang")
            .await
            .unwrap_err();
        assert!(matches!(err, HospitalError::InvalidInput(_)));
        assert_eq!(ledger.get_medicine(&medicine.id).await.unwrap().stock, 5);
        assert!(ledger.list_logs(None).await.unwrap().is_empty());

        let err = ledger.adjust_stock(&medicine.id, i32::MAX).await.unwrap_err();
        assert!(matches!(err, HospitalError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_concurrent_creates_get_distinct_codes() {
        let ledger = ledger(Duration::ZERO);

        let results = join_all(
            (0..10).map(|n| ledger.create_medicine(input(None, &format!("Obat {n}"), 1))),
        )
        .await;

        let ids: HashSet<String> = results
            .into_iter()
            .map(|medicine| medicine.unwrap().id.to_string())
            .collect();
        assert_eq!(ids.len(), 10);
        assert_eq!(ledger.list_medicines().await.unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_restock_keeps_stock_when_log_fails() {
        let store = Arc::new(FailingLogStore(MemoryStore::new()));
        let ledger = InventoryLedger::new(store, Arc::new(MedicineCache::new(Duration::ZERO)));
        let medicine = ledger.create_medicine(input(None, "Amlodipine 5mg", 4)).await.unwrap();

        let err = ledger.restock(&medicine.id, 6, "Staff Gudang").await.unwrap_err();
        assert!(matches!(err, HospitalError::Storage(_)));
        assert_eq!(ledger.get_medicine(&medicine.id).await.unwrap().stock, 10);
    }
}
