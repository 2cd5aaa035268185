//! HTTP surface.
//!
//! | Route | Description |
//! |-------|-------------|
//! | `GET /` | Liveness |
//! | `POST /api/har` | Capture `{ "url": ... }` and return the HAR document |
//!
//! Every request is traced by [`TraceLayer`] and checked against the origin
//! allow list (see [`cors`]).

// ============================================================================
// Submodules
// ============================================================================

/// Origin allow list enforcement.
pub mod cors;

/// Route handlers and error bodies.
pub mod handlers;

/// Graceful shutdown.
pub mod shutdown;

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::capture::{BrowserLauncher, Orchestrator};
use crate::config::ServerConfig;
use crate::error::Result;

// ============================================================================
// Re-exports
// ============================================================================

pub use cors::{NOT_ALLOWED, cors_layer, enforce_origin};
pub use handlers::{AppState, ApiError, CAPTURE_FAILED, ErrorBody, INVALID_REQUEST};
pub use shutdown::shutdown_signal;

// ============================================================================
// Router
// ============================================================================

/// Builds the application router.
pub fn router<L>(orchestrator: Arc<Orchestrator<L>>, config: &ServerConfig) -> Router
where
    L: BrowserLauncher + 'static,
{
    let config = Arc::new(config.clone());

    Router::new()
        .route("/", get(handlers::liveness))
        .route("/api/har", post(handlers::capture_har::<L>))
        .with_state(AppState { orchestrator })
        .layer(middleware::from_fn_with_state(
            Arc::clone(&config),
            enforce_origin,
        ))
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
}

/// Serves the API until a shutdown signal arrives.
///
/// # Errors
///
/// Returns [`Error::Io`](crate::Error::Io) if the listener cannot bind or the
/// server fails.
pub async fn serve<L>(orchestrator: Orchestrator<L>, config: ServerConfig) -> Result<()>
where
    L: BrowserLauncher + 'static,
{
    let listener = TcpListener::bind(config.socket_addr()).await?;
    info!(
        addr = %listener.local_addr()?,
        origins = ?config.allowed_origins,
        "HAR capture API listening"
    );

    let app = router(Arc::new(orchestrator), &config);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
