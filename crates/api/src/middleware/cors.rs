use axum::http::{header, Method};
use tower_http::cors::{Any, CorsLayer};

/// Build the CORS layer. Sessions ride on a `SameSite=Strict` cookie, so
/// cross-origin callers can read public responses but never act as admin.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE])
}
