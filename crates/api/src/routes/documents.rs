use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use gtm_site_core::document::nav::{self, NavItem, PageLinks};
use gtm_site_core::document::{Document, NewDocument};
use gtm_site_core::mutation::{DocumentPatch, MutationResult, PublishOutcome, ReorderRequest};
use gtm_site_core::search::SearchHit;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Document CRUD, ordering, navigation and search.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/documents", get(list_documents).post(create_document))
        .route("/v1/documents/order", put(reorder_documents))
        .route("/v1/documents/by-slug/{slug}", get(get_by_slug))
        .route(
            "/v1/documents/{id}",
            get(get_document)
                .patch(publish_document)
                .delete(delete_document),
        )
        .route("/v1/navigation", get(navigation))
        .route("/v1/navigation/{slug}", get(page_links))
        .route("/v1/search", get(search))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListParams {
    #[serde(default)]
    include_hidden: bool,
}

async fn list_documents(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<Document>>> {
    let docs = state.content().list_documents(params.include_hidden).await?;
    Ok(Json(docs))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateDocumentRequest {
    #[serde(flatten)]
    document: NewDocument,
    #[serde(default)]
    user_id: Option<String>,
}

async fn create_document(
    State(state): State<AppState>,
    Json(req): Json<CreateDocumentRequest>,
) -> ApiResult<(StatusCode, Json<Document>)> {
    let doc = state
        .content()
        .create_document(req.document, req.user_id.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(doc)))
}

async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Document>> {
    state
        .content()
        .get_document(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Document '{id}' not found")))
}

async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<Document>> {
    state
        .content()
        .get_document_by_slug(&slug)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Document with slug '{slug}' not found")))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublishRequest {
    #[serde(flatten)]
    patch: DocumentPatch,
    #[serde(default)]
    user_id: Option<String>,
}

/// Publish edits. Discards every pending draft for the document.
async fn publish_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<PublishRequest>,
) -> ApiResult<Json<PublishOutcome>> {
    let outcome = state
        .content()
        .publish(id, req.patch, req.user_id.as_deref())
        .await?;
    Ok(Json(outcome))
}

async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MutationResult>> {
    let doc = state.content().delete_document(id).await?;
    Ok(Json(MutationResult::new(doc.id, "delete")))
}

async fn reorder_documents(
    State(state): State<AppState>,
    Json(req): Json<ReorderRequest>,
) -> ApiResult<Json<Value>> {
    state.content().reorder(&req.updates).await?;
    Ok(Json(json!({ "updated": req.updates.len() })))
}

async fn navigation(State(state): State<AppState>) -> ApiResult<Json<Vec<NavItem>>> {
    Ok(Json(state.content().navigation().await?))
}

/// Previous and next pages around `slug`; both empty for unknown slugs.
async fn page_links(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<PageLinks>> {
    let items = state.content().navigation().await?;
    Ok(Json(nav::page_links(&items, &slug)))
}

#[derive(Debug, Default, Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
}

async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<SearchHit>>> {
    Ok(Json(state.content().search(&params.q).await?))
}
