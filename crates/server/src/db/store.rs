//! Storage abstraction shared by the service layer.

use async_trait::async_trait;
use sqlx::PgPool;

use dokterbubung_core::{CodeKind, MedicineId, PatientId, PrescriptionId, PrescriptionStatus};

use super::{
    MedicineRepository, PatientRepository, PrescriptionRepository, RepositoryError,
    StockLogRepository,
};
use crate::models::{Medicine, NewStockLog, Patient, Prescription, StockLog};

/// Outcome of a guarded stock adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockAdjustment {
    /// The delta was applied; `stock` is the new level.
    Applied { stock: i32 },
    /// The delta would have taken stock below zero. Nothing changed.
    Insufficient { available: i32 },
    /// The delta would have pushed stock past `i32::MAX`. Nothing changed.
    Overflow { available: i32 },
}

/// Everything the services need from persistent storage.
///
/// Every method is a single atomic step. Multi-step workflows (dispense,
/// restock) are composed in the service layer.
#[async_trait]
pub trait HospitalStore: Send + Sync {
    /// Draw the next value from the counter behind `kind`'s codes.
    async fn next_code_value(&self, kind: CodeKind) -> Result<i64, RepositoryError>;

    async fn list_medicines(&self) -> Result<Vec<Medicine>, RepositoryError>;
    async fn get_medicine(&self, id: &MedicineId) -> Result<Option<Medicine>, RepositoryError>;
    /// Insert a medicine. A taken code yields `RepositoryError::Conflict`.
    async fn insert_medicine(&self, medicine: &Medicine) -> Result<(), RepositoryError>;
    /// Add `delta` to stock unless the result would be negative or overflow.
    /// A missing medicine yields `RepositoryError::NotFound`.
    async fn adjust_stock(
        &self,
        id: &MedicineId,
        delta: i32,
    ) -> Result<StockAdjustment, RepositoryError>;
    async fn medicine_count(&self) -> Result<i64, RepositoryError>;

    /// All prescriptions with items, newest first.
    async fn list_prescriptions(&self) -> Result<Vec<Prescription>, RepositoryError>;
    async fn get_prescription(
        &self,
        id: &PrescriptionId,
    ) -> Result<Option<Prescription>, RepositoryError>;
    /// Insert header and items together. A taken code yields `RepositoryError::Conflict`.
    async fn insert_prescription(&self, prescription: &Prescription)
    -> Result<(), RepositoryError>;
    /// Compare-and-set the status. Returns `false` if the current status isn't `from`.
    async fn transition_prescription(
        &self,
        id: &PrescriptionId,
        from: PrescriptionStatus,
        to: PrescriptionStatus,
    ) -> Result<bool, RepositoryError>;

    async fn list_patients(&self) -> Result<Vec<Patient>, RepositoryError>;
    /// Insert a patient. A taken code yields `RepositoryError::Conflict`.
    async fn insert_patient(&self, patient: &Patient) -> Result<(), RepositoryError>;
    /// Returns `false` if no such patient existed.
    async fn delete_patient(&self, id: &PatientId) -> Result<bool, RepositoryError>;

    async fn append_log(&self, entry: &NewStockLog) -> Result<StockLog, RepositoryError>;
    /// Newest first, at most `limit` entries.
    async fn list_logs(&self, limit: i64) -> Result<Vec<StockLog>, RepositoryError>;

    /// Cheap liveness probe used by the readiness endpoint.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

// =============================================================================
// PostgreSQL
// =============================================================================

/// [`HospitalStore`] backed by `PostgreSQL`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HospitalStore for PgStore {
    async fn next_code_value(&self, kind: CodeKind) -> Result<i64, RepositoryError> {
        let value: i64 = sqlx::query_scalar("SELECT nextval($1::regclass)")
            .bind(kind.sequence_name())
            .fetch_one(&self.pool)
            .await?;
        Ok(value)
    }

    async fn list_medicines(&self) -> Result<Vec<Medicine>, RepositoryError> {
        MedicineRepository::new(&self.pool).list().await
    }

    async fn get_medicine(&self, id: &MedicineId) -> Result<Option<Medicine>, RepositoryError> {
        MedicineRepository::new(&self.pool).get(id).await
    }

    async fn insert_medicine(&self, medicine: &Medicine) -> Result<(), RepositoryError> {
        MedicineRepository::new(&self.pool).insert(medicine).await
    }

    async fn adjust_stock(
        &self,
        id: &MedicineId,
        delta: i32,
    ) -> Result<StockAdjustment, RepositoryError> {
        MedicineRepository::new(&self.pool)
            .adjust_stock(id, delta)
            .await
    }

    async fn medicine_count(&self) -> Result<i64, RepositoryError> {
        MedicineRepository::new(&self.pool).count().await
    }

    async fn list_prescriptions(&self) -> Result<Vec<Prescription>, RepositoryError> {
        PrescriptionRepository::new(&self.pool).list().await
    }

    async fn get_prescription(
        &self,
        id: &PrescriptionId,
    ) -> Result<Option<Prescription>, RepositoryError> {
        PrescriptionRepository::new(&self.pool).get(id).await
    }

    async fn insert_prescription(
        &self,
        prescription: &Prescription,
    ) -> Result<(), RepositoryError> {
        PrescriptionRepository::new(&self.pool)
            .insert(prescription)
            .await
    }

    async fn transition_prescription(
        &self,
        id: &PrescriptionId,
        from: PrescriptionStatus,
        to: PrescriptionStatus,
    ) -> Result<bool, RepositoryError> {
        PrescriptionRepository::new(&self.pool)
            .transition_status(id, from, to)
            .await
    }

    async fn list_patients(&self) -> Result<Vec<Patient>, RepositoryError> {
        PatientRepository::new(&self.pool).list().await
    }

    async fn insert_patient(&self, patient: &Patient) -> Result<(), RepositoryError> {
        PatientRepository::new(&self.pool).insert(patient).await
    }

    async fn delete_patient(&self, id: &PatientId) -> Result<bool, RepositoryError> {
        PatientRepository::new(&self.pool).delete(id).await
    }

    async fn append_log(&self, entry: &NewStockLog) -> Result<StockLog, RepositoryError> {
        StockLogRepository::new(&self.pool).append(entry).await
    }

    async fn list_logs(&self, limit: i64) -> Result<Vec<StockLog>, RepositoryError> {
        StockLogRepository::new(&self.pool).list_recent(limit).await
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
