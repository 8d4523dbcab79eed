use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use gtm_site_core::draft::{other_editors, PendingChange};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Pending-change overlay endpoints.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/documents/{id}/drafts", get(list_drafts))
        .route(
            "/v1/documents/{id}/drafts/{user_id}",
            put(upsert_draft).delete(clear_draft),
        )
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DraftListParams {
    user_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DraftList {
    drafts: Vec<PendingChange>,
    /// Editors other than the caller with a live draft.
    others_editing: usize,
}

async fn list_drafts(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<DraftListParams>,
) -> ApiResult<Json<DraftList>> {
    let drafts = state.content().list_drafts(id).await?;
    let me = params.user_id.as_deref().unwrap_or_default();
    let others_editing = other_editors(&drafts, me);
    Ok(Json(DraftList {
        drafts,
        others_editing,
    }))
}

#[derive(Debug, Deserialize)]
struct DraftBody {
    content: String,
}

async fn upsert_draft(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(Uuid, String)>,
    Json(body): Json<DraftBody>,
) -> ApiResult<Json<PendingChange>> {
    if user_id.trim().is_empty() {
        return Err(ApiError::BadRequest("userId must not be empty".to_string()));
    }
    let draft = state
        .content()
        .upsert_draft(id, &user_id, &body.content)
        .await?;
    Ok(Json(draft))
}

async fn clear_draft(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(Uuid, String)>,
) -> ApiResult<Json<Value>> {
    let cleared = state.content().clear_draft(id, &user_id).await?;
    Ok(Json(json!({ "cleared": cleared })))
}
