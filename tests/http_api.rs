//! HTTP API tests against a scripted browser.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

use har_capture::browser::PageEvent;
use har_capture::server::{self, CAPTURE_FAILED, ErrorBody, INVALID_REQUEST, NOT_ALLOWED};
use har_capture::testing::{ScriptedLauncher, redirect_sent, request_sent, response_received};
use har_capture::{CaptureConfig, Orchestrator, ServerConfig};

const ALLOWED: &str = "https://har-mvp.vercel.app";

fn app(launcher: ScriptedLauncher) -> Router {
    let orchestrator = Orchestrator::new(launcher, CaptureConfig::default());
    server::router(Arc::new(orchestrator), &ServerConfig::default())
}

fn post_har(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/har")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn test_liveness() {
    let response = app(ScriptedLauncher::new())
        .oneshot(Request::get("/").body(Body::empty()).expect("request"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert!(body["message"].is_string());
}

#[tokio::test(start_paused = true)]
async fn test_capture_bare_host() {
    let launcher = ScriptedLauncher::new().with_events([
        request_sent("https://example.com/"),
        response_received("https://example.com/", 200),
        PageEvent::NetworkIdle,
    ]);

    let response = app(launcher.clone())
        .oneshot(post_har(r#"{"url":"example.com"}"#))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .expect("header");
    assert_eq!(disposition, "attachment; filename=example.com.har");

    let body = json_body(response).await;
    assert_eq!(body["log"]["version"], "1.2");
    assert_eq!(body["log"]["creator"]["name"], env!("CARGO_PKG_NAME"));
    assert_eq!(body["log"]["pages"], Value::Array(Vec::new()));
    assert_eq!(body["log"]["entries"][0]["request"]["url"], "https://example.com/");
    assert_eq!(body["log"]["entries"][0]["response"]["status"], 200);

    assert_eq!(launcher.navigated(), ["https://example.com/"]);
    assert_eq!(launcher.release_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_unanswered_requests_serialize_null() {
    let launcher = ScriptedLauncher::new().with_events([
        request_sent("https://example.com/"),
        response_received("https://example.com/", 200),
        request_sent("https://example.com/never"),
        PageEvent::NetworkIdle,
    ]);

    let response = app(launcher)
        .oneshot(post_har(r#"{"url":"https://example.com/"}"#))
        .await
        .expect("response");

    let body = json_body(response).await;
    let entries = body["log"]["entries"].as_array().expect("entries");
    assert_eq!(entries.len(), 2);
    assert!(entries[1]["response"].is_null());
    assert_eq!(entries[1]["timings"]["wait"], -1);
}

#[tokio::test(start_paused = true)]
async fn test_redirect_chain() {
    let launcher = ScriptedLauncher::new().with_events([
        request_sent("http://example.com/"),
        redirect_sent("http://example.com/", "https://example.com/", 301),
        response_received("https://example.com/", 200),
        PageEvent::NetworkIdle,
    ]);

    let response = app(launcher)
        .oneshot(post_har(r#"{"url":"http://example.com"}"#))
        .await
        .expect("response");

    let body = json_body(response).await;
    let entries = body["log"]["entries"].as_array().expect("entries");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["response"]["status"], 301);
    assert_eq!(entries[0]["response"]["redirectURL"], "https://example.com/");
    assert_eq!(entries[1]["response"]["status"], 200);
}

#[tokio::test(start_paused = true)]
async fn test_navigation_timeout_returns_partial_har() {
    let launcher = ScriptedLauncher::new().with_events([
        request_sent("https://slow.example/"),
        request_sent("https://slow.example/a.js"),
        request_sent("https://slow.example/b.css"),
    ]);

    let response = app(launcher.clone())
        .oneshot(post_har(r#"{"url":"slow.example"}"#))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let entries = body["log"]["entries"].as_array().expect("entries");
    assert_eq!(entries.len(), 3);
    assert!(entries.iter().all(|e| e["response"].is_null()));
    assert_eq!(launcher.release_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_client_disconnect_still_releases_browser() {
    let launcher = ScriptedLauncher::new().with_events([request_sent("https://slow.example/")]);

    let pending = tokio::time::timeout(
        Duration::from_secs(5),
        app(launcher.clone()).oneshot(post_har(r#"{"url":"slow.example"}"#)),
    )
    .await;
    assert!(pending.is_err(), "capture should still be running");
    assert_eq!(launcher.acquire_count(), 1);

    tokio::time::sleep(Duration::from_secs(60)).await;

    assert_eq!(launcher.acquire_count(), 1);
    assert_eq!(launcher.release_count(), 1);
}

#[tokio::test]
async fn test_missing_url_is_rejected_without_launch() {
    let launcher = ScriptedLauncher::new();

    for body in ["{}", r#"{"url":""}"#, r#"{"url":"   "}"#, "not json", ""] {
        let response = app(launcher.clone())
            .oneshot(post_har(body))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {body:?}");
        let error: ErrorBody =
            serde_json::from_value(json_body(response).await).expect("error body");
        assert_eq!(error.error, INVALID_REQUEST);
        assert!(error.details.contains("URL is required"));
    }

    assert_eq!(launcher.acquire_count(), 0);
}

#[tokio::test]
async fn test_unsupported_scheme_is_rejected() {
    let response = app(ScriptedLauncher::new())
        .oneshot(post_har(r#"{"url":"file:///etc/passwd"}"#))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_launch_failure_returns_500() {
    let response = app(ScriptedLauncher::new().with_launch_failure("chromium exited"))
        .oneshot(post_har(r#"{"url":"example.com"}"#))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"], CAPTURE_FAILED);
    assert!(
        body["details"]
            .as_str()
            .is_some_and(|d| d.contains("chromium exited"))
    );
    assert!(body.get("log").is_none());
}

#[tokio::test(start_paused = true)]
async fn test_navigation_error_returns_500_and_releases() {
    let launcher = ScriptedLauncher::new().with_navigation_error("net::ERR_NAME_NOT_RESOLVED");

    let response = app(launcher.clone())
        .oneshot(post_har(r#"{"url":"nope.invalid"}"#))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"], CAPTURE_FAILED);
    assert!(
        body["details"]
            .as_str()
            .is_some_and(|d| d.contains("ERR_NAME_NOT_RESOLVED"))
    );
    assert_eq!(launcher.acquire_count(), 1);
    assert_eq!(launcher.release_count(), 1);
}

#[tokio::test]
async fn test_disallowed_origin_is_forbidden() {
    let launcher = ScriptedLauncher::new();
    let request = Request::builder()
        .method("POST")
        .uri("/api/har")
        .header(header::ORIGIN, "https://evil.example")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"url":"example.com"}"#))
        .expect("request");

    let response = app(launcher.clone())
        .oneshot(request)
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let error: ErrorBody = serde_json::from_value(json_body(response).await).expect("error body");
    assert_eq!(error.error, NOT_ALLOWED);
    assert_eq!(error.details, "https://evil.example");
    assert_eq!(launcher.acquire_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_allowed_origin_gets_cors_headers() {
    let launcher = ScriptedLauncher::new().with_events([PageEvent::NetworkIdle]);
    let request = Request::builder()
        .method("POST")
        .uri("/api/har")
        .header(header::ORIGIN, format!("{ALLOWED}/"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"url":"example.com"}"#))
        .expect("request");

    let response = app(launcher).oneshot(request).await.expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert!(headers.contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    let exposed = headers[header::ACCESS_CONTROL_EXPOSE_HEADERS]
        .to_str()
        .expect("header")
        .to_ascii_lowercase();
    assert!(exposed.contains("content-disposition"));
}

#[tokio::test]
async fn test_preflight() {
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/har")
        .header(header::ORIGIN, ALLOWED)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .expect("request");

    let response = app(ScriptedLauncher::new())
        .oneshot(request)
        .await
        .expect("response");

    assert!(response.status().is_success());
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], ALLOWED);
    let methods = response.headers()[header::ACCESS_CONTROL_ALLOW_METHODS]
        .to_str()
        .expect("header");
    assert!(methods.contains("POST"));
}
