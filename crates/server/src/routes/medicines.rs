//! Medicine and restock handlers.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, put},
};
use serde::{Deserialize, Serialize};

use dokterbubung_core::MedicineId;

use crate::error::AppError;
use crate::models::stock_log::DEFAULT_RESTOCK_PIC;
use crate::models::{CreateMedicineInput, Medicine};
use crate::state::AppState;

/// Build the medicines router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/medicines", get(list_medicines).post(create_medicine))
        .route("/medicines/{id}", get(get_medicine))
        .route("/medicines/{id}/restock", put(restock_medicine))
}

/// Request for receiving stock.
#[derive(Debug, Deserialize)]
pub struct RestockRequest {
    pub amount: i32,
    /// Who received the goods. Defaults to warehouse staff.
    #[serde(default)]
    pub pic: Option<String>,
}

/// Response after a restock.
#[derive(Debug, Serialize)]
pub struct RestockResponse {
    pub message: &'static str,
    pub stock: i32,
}

/// List all medicines.
///
/// # Errors
///
/// Returns an error if the store fails.
pub async fn list_medicines(State(state): State<AppState>) -> Result<Json<Vec<Medicine>>, AppError> {
    Ok(Json(state.hospital().inventory.list_medicines().await?))
}

/// Get one medicine.
///
/// # Errors
///
/// Returns 404 if the medicine doesn't exist.
pub async fn get_medicine(
    State(state): State<AppState>,
    Path(id): Path<MedicineId>,
) -> Result<Json<Medicine>, AppError> {
    Ok(Json(state.hospital().inventory.get_medicine(&id).await?))
}

/// Register a new medicine.
///
/// # Errors
///
/// Returns 400 for invalid input and 409 if the code is taken.
pub async fn create_medicine(
    State(state): State<AppState>,
    body: Result<Json<CreateMedicineInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Medicine>), AppError> {
    let Json(input) = body?;
    let medicine = state.hospital().inventory.create_medicine(input).await?;
    Ok((StatusCode::CREATED, Json(medicine)))
}

/// Receive stock for a medicine.
///
/// # Errors
///
/// Returns 400 for a non-positive amount and 404 for an unknown medicine.
pub async fn restock_medicine(
    State(state): State<AppState>,
    Path(id): Path<MedicineId>,
    body: Result<Json<RestockRequest>, JsonRejection>,
) -> Result<Json<RestockResponse>, AppError> {
    let Json(request) = body?;
    let pic = request
        .pic
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or(DEFAULT_RESTOCK_PIC);

    let stock = state
        .hospital()
        .inventory
        .restock(&id, request.amount, pic)
        .await?;

    Ok(Json(RestockResponse {
        message: "Stock updated successfully",
        stock,
    }))
}
