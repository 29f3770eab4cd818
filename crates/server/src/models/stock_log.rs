//! Stock movement log models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use dokterbubung_core::{LogId, MovementType};

/// PIC recorded for dispense movements.
pub const DISPENSE_PIC: &str = "Apoteker";

/// PIC recorded for restocks when the request names nobody.
pub const DEFAULT_RESTOCK_PIC: &str = "Staff Gudang";

/// Reference recorded for restock movements.
pub const RESTOCK_REF: &str = "Restock";

/// One append-only stock movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockLog {
    pub id: LogId,
    /// Day of the movement.
    pub date: NaiveDate,
    /// IN for restock, OUT for dispense.
    #[serde(rename = "type")]
    pub movement: MovementType,
    /// Medicine name at the time of the movement.
    pub medicine_name: String,
    pub qty: i32,
    /// Free-text reference: a prescription code or `Restock`.
    #[serde(rename = "ref")]
    pub reference: String,
    /// Person responsible.
    pub pic: String,
    /// Exact time of the movement; the listing sorts on this.
    pub created_at: DateTime<Utc>,
}

/// A movement about to be appended.
#[derive(Debug, Clone)]
pub struct NewStockLog {
    pub movement: MovementType,
    pub medicine_name: String,
    pub qty: i32,
    pub reference: String,
    pub pic: String,
}
