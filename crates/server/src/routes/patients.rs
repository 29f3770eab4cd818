//! Patient roster handlers.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::{delete, get},
};
use serde::Serialize;

use dokterbubung_core::PatientId;

use crate::error::AppError;
use crate::models::{AddPatientInput, Patient};
use crate::state::AppState;

/// Build the patients router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/patients", get(list_patients).post(add_patient))
        .route("/patients/{id}", delete(remove_patient))
}

/// Plain acknowledgement.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// List all patients.
///
/// # Errors
///
/// Returns an error if the store fails.
pub async fn list_patients(State(state): State<AppState>) -> Result<Json<Vec<Patient>>, AppError> {
    Ok(Json(state.hospital().patients.list().await?))
}

/// Add a patient to the waiting queue.
///
/// # Errors
///
/// Returns 400 if the name is missing.
pub async fn add_patient(
    State(state): State<AppState>,
    body: Result<Json<AddPatientInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Patient>), AppError> {
    let Json(input) = body?;
    let patient = state.hospital().patients.add(input).await?;
    Ok((StatusCode::CREATED, Json(patient)))
}

/// Remove a patient. Unknown codes succeed too.
///
/// # Errors
///
/// Returns an error if the store fails.
pub async fn remove_patient(
    State(state): State<AppState>,
    Path(id): Path<PatientId>,
) -> Result<Json<MessageResponse>, AppError> {
    state.hospital().patients.remove(&id).await?;
    Ok(Json(MessageResponse {
        message: "Patient removed successfully",
    }))
}
