use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;

use crate::error::ApiError;
use crate::state::AppState;

/// Name of the HTTP-only session cookie set on login.
pub const SESSION_COOKIE: &str = "gtm-auth";

/// Reject requests that do not carry a valid session cookie.
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = jar.get(SESSION_COOKIE).ok_or(ApiError::Unauthorized)?;
    if let Err(err) = state.sessions().verify(token.value()) {
        tracing::debug!(error = %err, path = %request.uri().path(), "session rejected");
        return Err(ApiError::Unauthorized);
    }
    Ok(next.run(request).await)
}
