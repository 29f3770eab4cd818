//! Database operations for prescriptions and their line items.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use dokterbubung_core::{MedicineId, PrescriptionId, PrescriptionStatus, Price};

use super::{RepositoryError, conflict_on_unique};
use crate::models::{Prescription, PrescriptionItem};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for prescription headers.
#[derive(Debug, sqlx::FromRow)]
struct PrescriptionRow {
    id: String,
    patient_name: String,
    patient_dob: NaiveDate,
    allergies: String,
    doctor_name: String,
    date: NaiveDate,
    status: PrescriptionStatus,
    total_price: Decimal,
    created_at: DateTime<Utc>,
}

impl PrescriptionRow {
    fn into_prescription(self, items: Vec<PrescriptionItem>) -> Prescription {
        Prescription {
            id: PrescriptionId::new(self.id),
            patient_name: self.patient_name,
            patient_dob: self.patient_dob,
            allergies: self.allergies,
            doctor_name: self.doctor_name,
            date: self.date,
            status: self.status,
            total_price: Price::new(self.total_price),
            items,
            created_at: self.created_at,
        }
    }
}

/// Internal row type for prescription items.
#[derive(Debug, sqlx::FromRow)]
struct PrescriptionItemRow {
    prescription_id: String,
    medicine_id: String,
    name: String,
    qty: i32,
    price: Decimal,
    signa: String,
}

impl From<PrescriptionItemRow> for PrescriptionItem {
    fn from(row: PrescriptionItemRow) -> Self {
        Self {
            prescription_id: PrescriptionId::new(row.prescription_id),
            medicine_id: MedicineId::new(row.medicine_id),
            name: row.name,
            qty: row.qty,
            price: Price::new(row.price),
            signa: row.signa,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for prescription database operations.
pub struct PrescriptionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PrescriptionRepository<'a> {
    /// Create a new prescription repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all prescriptions with their items, newest first.
    ///
    /// Items are fetched in one batched query rather than per prescription.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(&self) -> Result<Vec<Prescription>, RepositoryError> {
        let headers = sqlx::query_as::<_, PrescriptionRow>(
            r"
            SELECT id, patient_name, patient_dob, allergies, doctor_name,
                   date, status, total_price, created_at
            FROM hospital.prescription
            ORDER BY created_at DESC, id DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        let ids: Vec<&str> = headers.iter().map(|h| h.id.as_str()).collect();
        let item_rows = sqlx::query_as::<_, PrescriptionItemRow>(
            r"
            SELECT prescription_id, medicine_id, name, qty, price, signa
            FROM hospital.prescription_item
            WHERE prescription_id = ANY($1)
            ORDER BY prescription_id, position ASC
            ",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut items_by_prescription: HashMap<String, Vec<PrescriptionItem>> = HashMap::new();
        for row in item_rows {
            items_by_prescription
                .entry(row.prescription_id.clone())
                .or_default()
                .push(row.into());
        }

        Ok(headers
            .into_iter()
            .map(|header| {
                let items = items_by_prescription.remove(&header.id).unwrap_or_default();
                header.into_prescription(items)
            })
            .collect())
    }

    /// Get a prescription with its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: &PrescriptionId) -> Result<Option<Prescription>, RepositoryError> {
        let Some(header) = sqlx::query_as::<_, PrescriptionRow>(
            r"
            SELECT id, patient_name, patient_dob, allergies, doctor_name,
                   date, status, total_price, created_at
            FROM hospital.prescription
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, PrescriptionItemRow>(
            r"
            SELECT prescription_id, medicine_id, name, qty, price, signa
            FROM hospital.prescription_item
            WHERE prescription_id = $1
            ORDER BY position ASC
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(
            header.into_prescription(items.into_iter().map(Into::into).collect()),
        ))
    }

    /// Insert a prescription and all of its items in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the code is already taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn insert(&self, prescription: &Prescription) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            INSERT INTO hospital.prescription (
                id, patient_name, patient_dob, allergies, doctor_name,
                date, status, total_price, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(&prescription.id)
        .bind(&prescription.patient_name)
        .bind(prescription.patient_dob)
        .bind(&prescription.allergies)
        .bind(&prescription.doctor_name)
        .bind(prescription.date)
        .bind(prescription.status)
        .bind(prescription.total_price)
        .bind(prescription.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, &format!("prescription {}", prescription.id)))?;

        for (position, item) in (0_i32..).zip(&prescription.items) {
            sqlx::query(
                r"
                INSERT INTO hospital.prescription_item (
                    prescription_id, position, medicine_id, name, qty, price, signa
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ",
            )
            .bind(&prescription.id)
            .bind(position)
            .bind(&item.medicine_id)
            .bind(&item.name)
            .bind(item.qty)
            .bind(item.price)
            .bind(&item.signa)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Move a prescription from `from` to `to`.
    ///
    /// The status check is part of the `UPDATE`, so two concurrent callers
    /// cannot both perform the same transition.
    ///
    /// # Returns
    ///
    /// Returns `true` if the row was in `from` and is now in `to`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn transition_status(
        &self,
        id: &PrescriptionId,
        from: PrescriptionStatus,
        to: PrescriptionStatus,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE hospital.prescription
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            ",
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
