//! Database operations for medicines.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;

use dokterbubung_core::{MedicineId, Price};

use super::{RepositoryError, StockAdjustment, conflict_on_unique, is_out_of_range};
use crate::models::Medicine;

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for medicine queries.
#[derive(Debug, sqlx::FromRow)]
struct MedicineRow {
    id: String,
    name: String,
    kind: String,
    stock: i32,
    price: Decimal,
    expiry: NaiveDate,
    location: String,
}

impl From<MedicineRow> for Medicine {
    fn from(row: MedicineRow) -> Self {
        Self {
            id: MedicineId::new(row.id),
            name: row.name,
            kind: row.kind,
            stock: row.stock,
            price: Price::new(row.price),
            expiry: row.expiry,
            location: row.location,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for medicine database operations.
pub struct MedicineRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MedicineRepository<'a> {
    /// Create a new medicine repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all medicines ordered by code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Medicine>, RepositoryError> {
        let rows = sqlx::query_as::<_, MedicineRow>(
            r"
            SELECT id, name, kind, stock, price, expiry, location
            FROM hospital.medicine
            ORDER BY id ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a medicine by code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: &MedicineId) -> Result<Option<Medicine>, RepositoryError> {
        let row = sqlx::query_as::<_, MedicineRow>(
            r"
            SELECT id, name, kind, stock, price, expiry, location
            FROM hospital.medicine
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Insert a new medicine.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the code is already taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn insert(&self, medicine: &Medicine) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO hospital.medicine (id, name, kind, stock, price, expiry, location)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(&medicine.id)
        .bind(&medicine.name)
        .bind(&medicine.kind)
        .bind(medicine.stock)
        .bind(medicine.price)
        .bind(medicine.expiry)
        .bind(&medicine.location)
        .execute(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, &format!("medicine {}", medicine.id)))?;

        Ok(())
    }

    /// Atomically add `delta` to a medicine's stock.
    ///
    /// The guard lives in the `UPDATE` itself, so concurrent callers cannot
    /// lose updates or drive the counter below zero.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the medicine doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn adjust_stock(
        &self,
        id: &MedicineId,
        delta: i32,
    ) -> Result<StockAdjustment, RepositoryError> {
        let updated: Result<Option<i32>, sqlx::Error> = sqlx::query_scalar(
            r"
            UPDATE hospital.medicine
            SET stock = stock + $2, updated_at = NOW()
            WHERE id = $1 AND stock + $2 >= 0
            RETURNING stock
            ",
        )
        .bind(id)
        .bind(delta)
        .fetch_optional(self.pool)
        .await;

        let overflowed = match updated {
            Ok(Some(stock)) => return Ok(StockAdjustment::Applied { stock }),
            Ok(None) => false,
            Err(e) if is_out_of_range(&e) => true,
            Err(e) => return Err(e.into()),
        };

        // Nothing updated: the row is missing, the guard refused, or the sum
        // left the INTEGER range.
        let available: Option<i32> =
            sqlx::query_scalar("SELECT stock FROM hospital.medicine WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        available
            .map(|available| {
                if overflowed {
                    StockAdjustment::Overflow { available }
                } else {
                    StockAdjustment::Insufficient { available }
                }
            })
            .ok_or(RepositoryError::NotFound)
    }

    /// Count all medicines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM hospital.medicine")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
