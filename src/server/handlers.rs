//! Route handlers.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::capture::{BrowserLauncher, CaptureRequest, Orchestrator};
use crate::error::{Error, ErrorClass};

// ============================================================================
// Constants
// ============================================================================

/// Label of every 500 body.
pub const CAPTURE_FAILED: &str = "Failed to generate HAR file";

/// Label of every 400 body.
pub const INVALID_REQUEST: &str = "Invalid URL";

/// Liveness message.
pub const LIVENESS_MESSAGE: &str = "HAR capture API is running";

// ============================================================================
// State
// ============================================================================

/// Shared handler state.
pub struct AppState<L> {
    /// Capture driver shared by all requests.
    pub orchestrator: Arc<Orchestrator<L>>,
}

impl<L> Clone for AppState<L> {
    fn clone(&self) -> Self {
        Self {
            orchestrator: Arc::clone(&self.orchestrator),
        }
    }
}

// ============================================================================
// Response Bodies
// ============================================================================

/// Body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Short label.
    pub error: String,
    /// Human-readable cause.
    pub details: String,
}

impl ErrorBody {
    /// Creates a body.
    pub fn new(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: details.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Liveness {
    status: &'static str,
    message: &'static str,
}

// ============================================================================
// ApiError
// ============================================================================

/// A capture error on its way to the client.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl ApiError {
    /// Returns the response status for the wrapped error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self.0.class() {
            ErrorClass::Validation => StatusCode::BAD_REQUEST,
            ErrorClass::Launch | ErrorClass::Navigation | ErrorClass::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let label = if status == StatusCode::BAD_REQUEST {
            INVALID_REQUEST
        } else {
            error!(class = %self.0.class(), error = %self.0, "Capture request failed");
            CAPTURE_FAILED
        };
        (status, Json(ErrorBody::new(label, self.0.to_string()))).into_response()
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// `GET /`
pub async fn liveness() -> impl IntoResponse {
    Json(Liveness {
        status: "ok",
        message: LIVENESS_MESSAGE,
    })
}

/// `POST /api/har`
///
/// A body that is not a JSON object with a string `url` is treated as a
/// request without a URL.
///
/// The capture runs in its own task. A client that disconnects drops this
/// future but not the capture, so the browser is still released.
pub async fn capture_har<L>(
    State(state): State<AppState<L>>,
    body: Bytes,
) -> Result<Response, ApiError>
where
    L: BrowserLauncher + 'static,
{
    let request: CaptureRequest = serde_json::from_slice(&body).unwrap_or_else(|e| {
        debug!(error = %e, "Unreadable capture body");
        CaptureRequest::default()
    });

    let orchestrator = Arc::clone(&state.orchestrator);
    let outcome = tokio::spawn(async move { orchestrator.capture(&request).await })
        .await
        .map_err(Error::from)??;
    let body = outcome.har.to_json_pretty()?;

    info!(
        url = %outcome.target,
        entries = outcome.har.log.entries.len(),
        bytes = body.len(),
        "Serving HAR"
    );

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", outcome.filename),
            ),
        ],
        body,
    )
        .into_response())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::to_bytes;

    async fn body_of(response: Response) -> ErrorBody {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json")
    }

    #[tokio::test]
    async fn test_validation_maps_to_400() {
        let response = ApiError(Error::invalid_url("URL is required")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_of(response).await;
        assert_eq!(body.error, INVALID_REQUEST);
        assert!(body.details.contains("URL is required"));
    }

    #[tokio::test]
    async fn test_failures_map_to_500() {
        for error in [
            Error::launch_failed("no browser"),
            Error::navigation("https://x/", "net::ERR_NAME_NOT_RESOLVED"),
            Error::ConnectionClosed,
        ] {
            let details = error.to_string();
            let response = ApiError(error).into_response();
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
            let body = body_of(response).await;
            assert_eq!(body.error, CAPTURE_FAILED);
            assert_eq!(body.details, details);
        }
    }

    #[tokio::test]
    async fn test_failed_capture_task_maps_to_500() {
        let handle = tokio::spawn(async {});
        handle.abort();
        let error = Error::from(handle.await.expect_err("aborted"));

        let response = ApiError(error).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_of(response).await;
        assert_eq!(body.error, CAPTURE_FAILED);
        assert!(body.details.starts_with("Capture task failed"));
    }
}
