//! Stock movement log handler.

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    routing::get,
};
use serde::Deserialize;

use crate::error::AppError;
use crate::models::StockLog;
use crate::state::AppState;

/// Build the logs router.
pub fn router() -> Router<AppState> {
    Router::new().route("/logs", get(list_logs))
}

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Most recent stock movements, newest first.
///
/// # Errors
///
/// Returns 400 for a malformed limit.
pub async fn list_logs(
    State(state): State<AppState>,
    query: Result<Query<LogsQuery>, QueryRejection>,
) -> Result<Json<Vec<StockLog>>, AppError> {
    let Query(query) = query?;
    Ok(Json(state.hospital().inventory.list_logs(query.limit).await?))
}
