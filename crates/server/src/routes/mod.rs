//! HTTP route handlers for the hospital API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                                  - Liveness
//! GET    /health/ready                            - Readiness (storage reachable)
//!
//! # Inventory
//! GET    /api/hospital/medicines                  - Medicine listing
//! POST   /api/hospital/medicines                  - Register medicine
//! GET    /api/hospital/medicines/{id}             - Medicine detail
//! PUT    /api/hospital/medicines/{id}/restock     - Receive stock
//! GET    /api/hospital/logs?limit=N               - Stock movements, newest first
//!
//! # Prescriptions
//! GET    /api/hospital/prescriptions              - Prescription listing
//! POST   /api/hospital/prescriptions              - Write prescription
//! GET    /api/hospital/prescriptions/{id}         - Prescription detail
//! PUT    /api/hospital/prescriptions/{id}/status  - ?action=process|finish
//!
//! # Patients
//! GET    /api/hospital/patients                   - Patient roster
//! POST   /api/hospital/patients                   - Add patient
//! DELETE /api/hospital/patients/{id}              - Remove patient
//! ```

pub mod logs;
pub mod medicines;
pub mod patients;
pub mod prescriptions;

use axum::{
    Router,
    extract::State,
    http::{HeaderValue, Method, StatusCode},
    middleware,
    routing::get,
};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::config::HospitalConfig;
use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create the `/api/hospital` routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(medicines::router())
        .merge(prescriptions::router())
        .merge(patients::router())
        .merge(logs::router())
}

/// Build the complete application with health checks and middleware.
pub fn app(state: AppState) -> Router {
    let trace = TraceLayer::new_for_http()
        .make_span_with(|request: &axum::http::Request<_>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
                status = tracing::field::Empty,
                latency_ms = tracing::field::Empty,
            )
        })
        .on_response(
            |response: &axum::http::Response<_>, latency: std::time::Duration, span: &Span| {
                span.record("status", response.status().as_u16());
                span.record(
                    "latency_ms",
                    u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                );
                DefaultOnResponse::default().on_response(response, latency, span);
            },
        );

    let layers = ServiceBuilder::new()
        .layer(trace)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors_layer(state.config()))
        .layer(timeout_layer(state.config()));

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api/hospital", routes())
        .layer(layers)
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Requests running past the configured timeout get a 408.
fn timeout_layer(config: &HospitalConfig) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, config.request_timeout)
}

fn cors_layer(config: &HospitalConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    match &config.cors_origins {
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(e) => {
                        tracing::warn!(%origin, error = %e, "Ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();
            layer.allow_origin(AllowOrigin::list(origins))
        }
        None => layer.allow_origin(Any),
    }
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the storage backend is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, header};
    use tower::ServiceExt;

    use super::*;
    use crate::db::MemoryStore;
    use crate::middleware::REQUEST_ID_HEADER;

    fn test_app() -> Router {
        app(AppState::new(
            HospitalConfig::in_memory(),
            Arc::new(MemoryStore::new()),
        ))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_slow_request_times_out_with_408() {
        let mut config = HospitalConfig::in_memory();
        config.request_timeout = Duration::from_millis(10);
        let slow = Router::new()
            .route(
                "/slow",
                get(|| async { tokio::time::sleep(Duration::from_secs(5)).await }),
            )
            .layer(timeout_layer(&config));

        let response = slow
            .oneshot(Request::get("/slow").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    }

    #[tokio::test]
    async fn test_health_and_readiness() {
        let response = test_app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = test_app()
            .oneshot(Request::get("/health/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let response = test_app()
            .oneshot(
                Request::get("/api/hospital/patients")
                    .header(REQUEST_ID_HEADER, "rx-7")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[REQUEST_ID_HEADER], "rx-7");
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let response = test_app()
            .oneshot(
                Request::post("/api/hospital/patients")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{\"name\":"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_unknown_prescription_is_not_found() {
        let response = test_app()
            .oneshot(
                Request::put("/api/hospital/prescriptions/RSP-0404/status?action=process")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await["error"],
            "prescription RSP-0404 not found"
        );
    }

    #[tokio::test]
    async fn test_restock_round_trip() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(
                Request::post("/api/hospital/medicines")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        r#"{"name":"Paracetamol 500mg","type":"Tablet","stock":3,"price":"5000","expiry":"2027-01-15","location":"Rak A2"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let id = body_json(response).await["id"].as_str().unwrap().to_string();

        let response = app
            .oneshot(
                Request::put(format!("/api/hospital/medicines/{id}/restock"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"amount":7}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["stock"], 10);
        assert_eq!(body["message"], "Stock updated successfully");
    }
}
