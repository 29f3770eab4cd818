//! Database operations for the patient roster.

use chrono::NaiveDate;
use sqlx::PgPool;

use dokterbubung_core::{PatientId, PatientStatus};

use super::{RepositoryError, conflict_on_unique};
use crate::models::Patient;

/// Internal row type for patient queries.
#[derive(Debug, sqlx::FromRow)]
struct PatientRow {
    id: String,
    name: String,
    dob: NaiveDate,
    status: PatientStatus,
    allergies: String,
}

impl From<PatientRow> for Patient {
    fn from(row: PatientRow) -> Self {
        Self {
            id: PatientId::new(row.id),
            name: row.name,
            dob: row.dob,
            status: row.status,
            allergies: row.allergies,
        }
    }
}

/// Repository for patient database operations.
pub struct PatientRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PatientRepository<'a> {
    /// Create a new patient repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all patients ordered by code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Patient>, RepositoryError> {
        let rows = sqlx::query_as::<_, PatientRow>(
            r"
            SELECT id, name, dob, status, allergies
            FROM hospital.patient
            ORDER BY id ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Insert a new patient.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the code is already taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn insert(&self, patient: &Patient) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO hospital.patient (id, name, dob, status, allergies)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(&patient.id)
        .bind(&patient.name)
        .bind(patient.dob)
        .bind(patient.status)
        .bind(&patient.allergies)
        .execute(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, &format!("patient {}", patient.id)))?;

        Ok(())
    }

    /// Delete a patient.
    ///
    /// # Returns
    ///
    /// Returns `true` if the patient was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: &PatientId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM hospital.patient WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
