//! Origin policy.
//!
//! Two layers enforce the allow list. [`cors_layer`] adds the CORS response
//! headers browsers need. [`enforce_origin`] rejects requests from unlisted
//! origins with `403` before any handler runs, since CORS headers alone only
//! stop a browser from reading the response. Requests without `Origin`
//! (curl, server-to-server) pass.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Request, State};
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

use crate::config::ServerConfig;

use super::handlers::ErrorBody;

/// Label of the `403` body.
pub const NOT_ALLOWED: &str = "Not allowed by CORS";

/// Builds the CORS header layer for `config`'s allow list.
#[must_use]
pub fn cors_layer(config: Arc<ServerConfig>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _| {
            origin
                .to_str()
                .is_ok_and(|origin| config.is_origin_allowed(origin))
        }))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
        .expose_headers([header::CONTENT_DISPOSITION])
}

/// Rejects requests whose `Origin` is not on the allow list.
pub async fn enforce_origin(
    State(config): State<Arc<ServerConfig>>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(origin) = request.headers().get(header::ORIGIN) {
        let origin = String::from_utf8_lossy(origin.as_bytes()).into_owned();
        if !config.is_origin_allowed(&origin) {
            warn!(origin = %origin, path = %request.uri().path(), "Rejected origin");
            return (
                StatusCode::FORBIDDEN,
                Json(ErrorBody::new(NOT_ALLOWED, origin)),
            )
                .into_response();
        }
    }
    next.run(request).await
}
