//! In-process [`HospitalStore`] for tests and local demos.
//!
//! Mirrors the `PostgreSQL` semantics: guarded stock updates, compare-and-set
//! status transitions, unique codes and newest-first log ordering.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI32, AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use dokterbubung_core::{CodeKind, LogId, MedicineId, PatientId, PrescriptionId, PrescriptionStatus};

use super::{HospitalStore, RepositoryError, StockAdjustment};
use crate::models::{Medicine, NewStockLog, Patient, Prescription, StockLog};

#[derive(Debug, Default)]
struct Tables {
    medicines: BTreeMap<MedicineId, Medicine>,
    prescriptions: BTreeMap<PrescriptionId, Prescription>,
    patients: BTreeMap<PatientId, Patient>,
    logs: Vec<StockLog>,
}

/// Memory-backed store. Cloning is not supported; share it behind an `Arc`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    medicine_seq: AtomicI64,
    prescription_seq: AtomicI64,
    patient_seq: AtomicI64,
    log_seq: AtomicI32,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    const fn sequence(&self, kind: CodeKind) -> &AtomicI64 {
        match kind {
            CodeKind::Medicine => &self.medicine_seq,
            CodeKind::Prescription => &self.prescription_seq,
            CodeKind::Patient => &self.patient_seq,
        }
    }
}

#[async_trait]
impl HospitalStore for MemoryStore {
    async fn next_code_value(&self, kind: CodeKind) -> Result<i64, RepositoryError> {
        Ok(self.sequence(kind).fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn list_medicines(&self) -> Result<Vec<Medicine>, RepositoryError> {
        Ok(self.tables.read().await.medicines.values().cloned().collect())
    }

    async fn get_medicine(&self, id: &MedicineId) -> Result<Option<Medicine>, RepositoryError> {
        Ok(self.tables.read().await.medicines.get(id).cloned())
    }

    async fn insert_medicine(&self, medicine: &Medicine) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        if tables.medicines.contains_key(&medicine.id) {
            return Err(RepositoryError::Conflict(format!(
                "medicine {} already exists",
                medicine.id
            )));
        }
        if medicine.stock < 0 {
            return Err(RepositoryError::DataCorruption(
                "stock must not be negative".to_string(),
            ));
        }
        tables
            .medicines
            .insert(medicine.id.clone(), medicine.clone());
        Ok(())
    }

    async fn adjust_stock(
        &self,
        id: &MedicineId,
        delta: i32,
    ) -> Result<StockAdjustment, RepositoryError> {
        let mut tables = self.tables.write().await;
        let medicine = tables
            .medicines
            .get_mut(id)
            .ok_or(RepositoryError::NotFound)?;

        let available = medicine.stock;
        match available.checked_add(delta) {
            Some(stock) if stock >= 0 => {
                medicine.stock = stock;
                Ok(StockAdjustment::Applied { stock })
            }
            Some(_) => Ok(StockAdjustment::Insufficient { available }),
            None if delta > 0 => Ok(StockAdjustment::Overflow { available }),
            None => Ok(StockAdjustment::Insufficient { available }),
        }
    }

    async fn medicine_count(&self) -> Result<i64, RepositoryError> {
        let count = self.tables.read().await.medicines.len();
        i64::try_from(count).map_err(|e| RepositoryError::DataCorruption(e.to_string()))
    }

    async fn list_prescriptions(&self) -> Result<Vec<Prescription>, RepositoryError> {
        let mut prescriptions: Vec<Prescription> = self
            .tables
            .read()
            .await
            .prescriptions
            .values()
            .cloned()
            .collect();
        prescriptions.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(prescriptions)
    }

    async fn get_prescription(
        &self,
        id: &PrescriptionId,
    ) -> Result<Option<Prescription>, RepositoryError> {
        Ok(self.tables.read().await.prescriptions.get(id).cloned())
    }

    async fn insert_prescription(
        &self,
        prescription: &Prescription,
    ) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        if tables.prescriptions.contains_key(&prescription.id) {
            return Err(RepositoryError::Conflict(format!(
                "prescription {} already exists",
                prescription.id
            )));
        }
        tables
            .prescriptions
            .insert(prescription.id.clone(), prescription.clone());
        Ok(())
    }

    async fn transition_prescription(
        &self,
        id: &PrescriptionId,
        from: PrescriptionStatus,
        to: PrescriptionStatus,
    ) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.write().await;
        match tables.prescriptions.get_mut(id) {
            Some(prescription) if prescription.status == from => {
                prescription.status = to;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_patients(&self) -> Result<Vec<Patient>, RepositoryError> {
        Ok(self.tables.read().await.patients.values().cloned().collect())
    }

    async fn insert_patient(&self, patient: &Patient) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        if tables.patients.contains_key(&patient.id) {
            return Err(RepositoryError::Conflict(format!(
                "patient {} already exists",
                patient.id
            )));
        }
        tables.patients.insert(patient.id.clone(), patient.clone());
        Ok(())
    }

    async fn delete_patient(&self, id: &PatientId) -> Result<bool, RepositoryError> {
        Ok(self.tables.write().await.patients.remove(id).is_some())
    }

    async fn append_log(&self, entry: &NewStockLog) -> Result<StockLog, RepositoryError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let log = StockLog {
            id: LogId::new(self.log_seq.fetch_add(1, Ordering::SeqCst) + 1),
            date: now.date_naive(),
            movement: entry.movement,
            medicine_name: entry.medicine_name.clone(),
            qty: entry.qty,
            reference: entry.reference.clone(),
            pic: entry.pic.clone(),
            created_at: now,
        };
        tables.logs.push(log.clone());
        Ok(log)
    }

    async fn list_logs(&self, limit: i64) -> Result<Vec<StockLog>, RepositoryError> {
        let take = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
        let tables = self.tables.read().await;
        let mut logs: Vec<StockLog> = tables.logs.clone();
        logs.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        logs.truncate(take);
        Ok(logs)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use dokterbubung_core::{MovementType, PatientStatus, Price};

    fn medicine(id: &str, stock: i32) -> Medicine {
        Medicine {
            id: MedicineId::new(id),
            name: format!("Medicine {id}"),
            kind: "Tablet".to_string(),
            stock,
            price: Price::from_rupiah(1_000),
            expiry: NaiveDate::from_ymd_opt(2027, 1, 1).unwrap(),
            location: "Rak A1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_sequences_are_independent_per_kind() {
        let store = MemoryStore::new();
        assert_eq!(store.next_code_value(CodeKind::Medicine).await.unwrap(), 1);
        assert_eq!(store.next_code_value(CodeKind::Medicine).await.unwrap(), 2);
        assert_eq!(store.next_code_value(CodeKind::Patient).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_medicine_is_conflict() {
        let store = MemoryStore::new();
        store.insert_medicine(&medicine("OBT001", 5)).await.unwrap();
        let err = store
            .insert_medicine(&medicine("OBT001", 9))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_adjust_stock_refuses_negative() {
        let store = MemoryStore::new();
        store.insert_medicine(&medicine("OBT001", 5)).await.unwrap();

        let id = MedicineId::new("OBT001");
        assert_eq!(
            store.adjust_stock(&id, -6).await.unwrap(),
            StockAdjustment::Insufficient { available: 5 }
        );
        assert_eq!(
            store.adjust_stock(&id, -5).await.unwrap(),
            StockAdjustment::Applied { stock: 0 }
        );
        assert!(matches!(
            store.adjust_stock(&MedicineId::new("NOPE"), 1).await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_adjust_stock_reports_overflow() {
        let store = MemoryStore::new();
        store.insert_medicine(&medicine("OBT001", 5)).await.unwrap();

        let id = MedicineId::new("OBT001");
        assert_eq!(
            store.adjust_stock(&id, i32::MAX).await.unwrap(),
            StockAdjustment::Overflow { available: 5 }
        );
        assert_eq!(store.get_medicine(&id).await.unwrap().unwrap().stock, 5);
    }

    #[tokio::test]
    async fn test_transition_is_compare_and_set() {
        let store = MemoryStore::new();
        let prescription = Prescription {
            id: PrescriptionId::new("RSP-0001"),
            patient_name: "Siti Aminah".to_string(),
            patient_dob: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            allergies: "-".to_string(),
            doctor_name: "dr. Bubung".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            status: PrescriptionStatus::Pending,
            total_price: Price::ZERO,
            items: Vec::new(),
            created_at: Utc::now(),
        };
        store.insert_prescription(&prescription).await.unwrap();

        let id = &prescription.id;
        assert!(
            store
                .transition_prescription(id, PrescriptionStatus::Pending, PrescriptionStatus::Process)
                .await
                .unwrap()
        );
        assert!(
            !store
                .transition_prescription(id, PrescriptionStatus::Pending, PrescriptionStatus::Process)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_logs_newest_first_with_limit() {
        let store = MemoryStore::new();
        for qty in 1..=3 {
            store
                .append_log(&NewStockLog {
                    movement: MovementType::In,
                    medicine_name: "Paracetamol 500mg".to_string(),
                    qty,
                    reference: "Restock".to_string(),
                    pic: "Staff Gudang".to_string(),
                })
                .await
                .unwrap();
        }

        let logs = store.list_logs(2).await.unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].qty, 3);
        assert_eq!(logs[1].qty, 2);
    }

    #[tokio::test]
    async fn test_delete_patient_reports_missing() {
        let store = MemoryStore::new();
        let patient = Patient {
            id: PatientId::new("P-001"),
            name: "Rahmat Hidayat".to_string(),
            dob: NaiveDate::from_ymd_opt(1988, 5, 12).unwrap(),
            status: PatientStatus::Waiting,
            allergies: "-".to_string(),
        };
        store.insert_patient(&patient).await.unwrap();

        assert!(store.delete_patient(&patient.id).await.unwrap());
        assert!(!store.delete_patient(&patient.id).await.unwrap());
    }
}
