use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use gtm_site_core::media::{MediaAsset, MediaWithUrl, NewMedia, UploadTicket};
use gtm_site_core::mutation::MutationResult;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Media library. Uploads are two-step: get a ticket, PUT the bytes to its
/// URL, then record the metadata here.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/media/upload-url", post(upload_url))
        .route("/v1/media", get(list_media).post(save_media))
        .route("/v1/media/{id}", get(get_media).delete(delete_media))
}

async fn upload_url(State(state): State<AppState>) -> Json<UploadTicket> {
    Json(state.content().issue_upload())
}

async fn list_media(State(state): State<AppState>) -> ApiResult<Json<Vec<MediaWithUrl>>> {
    Ok(Json(state.content().list_media().await?))
}

async fn save_media(
    State(state): State<AppState>,
    Json(new): Json<NewMedia>,
) -> ApiResult<(StatusCode, Json<MediaAsset>)> {
    if new.filename.trim().is_empty() {
        return Err(ApiError::BadRequest("filename must not be empty".to_string()));
    }
    let asset = state.content().save_media(new).await?;
    Ok((StatusCode::CREATED, Json(asset)))
}

async fn get_media(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MediaWithUrl>> {
    state
        .content()
        .get_media(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Media '{id}' not found")))
}

async fn delete_media(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MutationResult>> {
    let asset = state.content().remove_media(id).await?;
    Ok(Json(MutationResult::new(asset.id, "delete")))
}
