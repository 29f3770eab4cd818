//! Database operations for the append-only stock movement log.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use dokterbubung_core::{LogId, MovementType};

use super::RepositoryError;
use crate::models::{NewStockLog, StockLog};

/// Internal row type for stock log queries.
#[derive(Debug, sqlx::FromRow)]
struct StockLogRow {
    id: i32,
    date: NaiveDate,
    movement: MovementType,
    medicine_name: String,
    qty: i32,
    reference: String,
    pic: String,
    created_at: DateTime<Utc>,
}

impl From<StockLogRow> for StockLog {
    fn from(row: StockLogRow) -> Self {
        Self {
            id: LogId::new(row.id),
            date: row.date,
            movement: row.movement,
            medicine_name: row.medicine_name,
            qty: row.qty,
            reference: row.reference,
            pic: row.pic,
            created_at: row.created_at,
        }
    }
}

/// Repository for stock log database operations.
pub struct StockLogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StockLogRepository<'a> {
    /// Create a new stock log repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Append a movement. The date and timestamp are set by the database.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn append(&self, entry: &NewStockLog) -> Result<StockLog, RepositoryError> {
        let row = sqlx::query_as::<_, StockLogRow>(
            r"
            INSERT INTO hospital.stock_log (movement, medicine_name, qty, reference, pic)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, date, movement, medicine_name, qty, reference, pic, created_at
            ",
        )
        .bind(entry.movement)
        .bind(&entry.medicine_name)
        .bind(entry.qty)
        .bind(&entry.reference)
        .bind(&entry.pic)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// List the most recent movements, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<StockLog>, RepositoryError> {
        let rows = sqlx::query_as::<_, StockLogRow>(
            r"
            SELECT id, date, movement, medicine_name, qty, reference, pic, created_at
            FROM hospital.stock_log
            ORDER BY created_at DESC, id DESC
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
