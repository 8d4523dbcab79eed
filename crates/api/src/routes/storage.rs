use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use tower_http::limit::RequestBodyLimitLayer;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Raw blob upload and download. Upload tickets point here.
pub fn routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/v1/storage/{storage_id}", get(download).put(upload))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
}

async fn upload(
    State(state): State<AppState>,
    Path(storage_id): Path<String>,
    body: Bytes,
) -> ApiResult<StatusCode> {
    state.content().blobs().put(&storage_id, &body).await?;
    tracing::info!(storage_id = %storage_id, bytes = body.len(), "blob stored");
    Ok(StatusCode::NO_CONTENT)
}

async fn download(
    State(state): State<AppState>,
    Path(storage_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let bytes = state
        .content()
        .blobs()
        .get(&storage_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Blob '{storage_id}' not found")))?;
    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        bytes,
    ))
}
