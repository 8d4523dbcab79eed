use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Health check routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/v1/ping", get(ping))
}

/// Full health check, including the content store.
async fn health_check(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    state
        .content()
        .ping()
        .await
        .map_err(|e| ApiError::Internal(format!("store health check failed: {e}")))?;

    Ok(Json(json!({
        "status": "ok",
        "store": "connected",
        "subscribers": state.event_bus().subscriber_count(),
    })))
}

/// Lightweight ping, no store check.
async fn ping() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
