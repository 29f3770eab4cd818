//! Unified error handling for the HTTP layer.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::services::HospitalError;

/// Application-level error type returned by handlers.
#[derive(Debug, Error)]
pub enum AppError {
    /// A service operation failed.
    #[error(transparent)]
    Hospital(#[from] HospitalError),

    /// Bad request from client (malformed body or query).
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Hospital(err) => match err {
                HospitalError::NotFound(_) => StatusCode::NOT_FOUND,
                HospitalError::InsufficientStock { .. }
                | HospitalError::InvalidTransition { .. }
                | HospitalError::Conflict(_) => StatusCode::CONFLICT,
                HospitalError::InvalidInput(_) | HospitalError::InvalidAction(_) => {
                    StatusCode::BAD_REQUEST
                }
                HospitalError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Log server errors with Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Hospital request error"
            );
        }

        // Don't expose internal error details to clients
        let message = if status.is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use dokterbubung_core::PrescriptionStatus;

    use super::*;
    use crate::db::RepositoryError;

    fn status_of(err: impl Into<AppError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            status_of(HospitalError::NotFound("medicine OBT9".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(HospitalError::InsufficientStock {
                item: "Simvastatin 10mg".into(),
                requested: 9,
                available: 5,
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(HospitalError::InvalidTransition {
                from: PrescriptionStatus::Pending,
                to: PrescriptionStatus::Selesai,
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(HospitalError::Conflict("medicine OBT001 already exists".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(HospitalError::InvalidAction("cancel".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(HospitalError::InvalidInput("name".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(HospitalError::Storage(RepositoryError::NotFound)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(AppError::BadRequest("bad json".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_server_errors_hide_details() {
        let response = AppError::Hospital(HospitalError::Storage(RepositoryError::DataCorruption(
            "stock column is text".into(),
        )))
        .into_response();

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Internal server error");
    }

    #[tokio::test]
    async fn test_client_errors_carry_message() {
        let response = AppError::from(HospitalError::NotFound("prescription RSP-0042".into()))
            .into_response();

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "prescription RSP-0042 not found");
    }
}
