//! Prescription handlers.

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    routing::{get, put},
};
use serde::{Deserialize, Serialize};

use dokterbubung_core::{PrescriptionId, PrescriptionStatus};

use crate::error::AppError;
use crate::models::{CreatePrescriptionInput, Prescription};
use crate::state::AppState;

/// Build the prescriptions router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/prescriptions",
            get(list_prescriptions).post(create_prescription),
        )
        .route("/prescriptions/{id}", get(get_prescription))
        .route("/prescriptions/{id}/status", put(update_status))
}

/// Query for a status change: `?action=process` or `?action=finish`.
#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    #[serde(default)]
    pub action: Option<String>,
}

/// Response after a status change.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub message: &'static str,
    pub status: PrescriptionStatus,
}

/// List all prescriptions, newest first.
///
/// # Errors
///
/// Returns an error if the store fails.
pub async fn list_prescriptions(
    State(state): State<AppState>,
) -> Result<Json<Vec<Prescription>>, AppError> {
    Ok(Json(state.hospital().prescriptions.list().await?))
}

/// Get one prescription with its items.
///
/// # Errors
///
/// Returns 404 if the prescription doesn't exist.
pub async fn get_prescription(
    State(state): State<AppState>,
    Path(id): Path<PrescriptionId>,
) -> Result<Json<Prescription>, AppError> {
    Ok(Json(state.hospital().prescriptions.get(&id).await?))
}

/// Write a new prescription.
///
/// # Errors
///
/// Returns 400 for invalid input.
pub async fn create_prescription(
    State(state): State<AppState>,
    body: Result<Json<CreatePrescriptionInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Prescription>), AppError> {
    let Json(input) = body?;
    let prescription = state.hospital().prescriptions.create(input).await?;
    Ok((StatusCode::CREATED, Json(prescription)))
}

/// Process or finish a prescription.
///
/// # Errors
///
/// Returns 400 for an unknown action, 404 for an unknown prescription and
/// 409 when stock is short or the prescription is in the wrong state.
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<PrescriptionId>,
    query: Result<Query<StatusQuery>, QueryRejection>,
) -> Result<Json<StatusResponse>, AppError> {
    let Query(query) = query?;
    let action = query.action.unwrap_or_default();

    let status = state
        .hospital()
        .prescriptions
        .advance(&id, &action)
        .await?;

    Ok(Json(StatusResponse {
        message: "Status updated successfully",
        status,
    }))
}
