use axum::extract::rejection::JsonRejection;
use axum::{extract::State, routing::post, Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::SESSION_COOKIE;
use crate::state::AppState;

/// Login/logout routes. These sit outside the session gate.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth", post(login))
        .route("/api/auth/logout", post(logout))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    password: String,
}

/// Exchange the shared password for a session cookie.
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<(CookieJar, Json<Value>)> {
    let Json(request) = body.map_err(|_| ApiError::BadRequest("Invalid request".to_string()))?;

    let gate = state.password().ok_or_else(|| {
        ApiError::Internal("ADMIN_PASSWORD_HASH is not configured".to_string())
    })?;
    if !gate.verify(&request.password) {
        tracing::warn!("login rejected: wrong password");
        return Err(ApiError::Unauthorized);
    }

    let token = state
        .sessions()
        .issue(chrono::Utc::now())
        .map_err(|e| ApiError::Internal(format!("could not issue session: {e}")))?;
    let max_age = time::Duration::seconds(state.sessions().ttl().as_secs() as i64);
    let cookie = Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .secure(state.config().cookie_secure)
        .same_site(SameSite::Strict)
        .max_age(max_age)
        .path("/");

    tracing::info!("admin session started");
    Ok((jar.add(cookie), Json(json!({ "success": true }))))
}

async fn logout(jar: CookieJar) -> (CookieJar, Json<Value>) {
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, Json(json!({ "success": true })))
}
