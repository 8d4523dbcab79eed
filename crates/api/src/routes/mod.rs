pub mod auth;
pub mod documents;
pub mod drafts;
pub mod health;
pub mod listen;
pub mod media;
pub mod settings;
pub mod storage;


use axum::middleware::from_fn_with_state;
use axum::Router;

use crate::middleware::auth::require_session;
use crate::state::AppState;

/// Assemble the full router with all route groups.
///
/// Health and login stay public; everything else needs a session cookie.
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .merge(documents::routes())
        .merge(drafts::routes())
        .merge(settings::routes())
        .merge(media::routes())
        .merge(storage::routes(state.config().max_upload_bytes))
        .merge(listen::routes())
        .route_layer(from_fn_with_state(state.clone(), require_session));

    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(protected)
        .with_state(state)
}
