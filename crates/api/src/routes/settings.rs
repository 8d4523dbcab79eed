use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use gtm_site_core::settings::{LogoMode, Setting};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Site settings and the light/dark logos.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/settings", get(list_settings))
        .route("/v1/settings/{key}", get(get_setting).put(set_setting))
        .route("/v1/logo/{mode}", get(get_logo).put(save_logo))
}

async fn list_settings(State(state): State<AppState>) -> ApiResult<Json<Vec<Setting>>> {
    Ok(Json(state.content().list_settings().await?))
}

async fn get_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Json<Setting>> {
    state
        .content()
        .get_setting(&key)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Setting '{key}' not found")))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetSettingRequest {
    value: String,
    #[serde(default)]
    updated_by: Option<String>,
}

async fn set_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<SetSettingRequest>,
) -> ApiResult<Json<Setting>> {
    if key.trim().is_empty() {
        return Err(ApiError::BadRequest("setting key must not be empty".to_string()));
    }
    let setting = state
        .content()
        .set_setting(&key, &req.value, req.updated_by.as_deref())
        .await?;
    Ok(Json(setting))
}

fn logo_mode(raw: &str) -> ApiResult<LogoMode> {
    raw.parse().map_err(ApiError::BadRequest)
}

/// `{"url": null}` when no logo has been saved for the mode.
async fn get_logo(
    State(state): State<AppState>,
    Path(mode): Path<String>,
) -> ApiResult<Json<Value>> {
    let url = state.content().logo_url(logo_mode(&mode)?).await?;
    Ok(Json(json!({ "url": url })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveLogoRequest {
    storage_id: String,
    #[serde(default)]
    updated_by: Option<String>,
}

async fn save_logo(
    State(state): State<AppState>,
    Path(mode): Path<String>,
    Json(req): Json<SaveLogoRequest>,
) -> ApiResult<Json<Setting>> {
    let setting = state
        .content()
        .save_logo(logo_mode(&mode)?, &req.storage_id, req.updated_by.as_deref())
        .await?;
    Ok(Json(setting))
}
