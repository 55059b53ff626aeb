//! Router-level tests that need no database

mod helpers;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use helpers::{lazy_state, test_settings};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    alumni_portal::router(lazy_state(test_settings("http://127.0.0.1:1")))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_root_reports_name_and_version() {
    let response = app().oneshot(get("/api/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["message"], "Alumni Portal API");
    assert_eq!(body["version"], alumni_portal::VERSION);
}

#[tokio::test]
async fn test_health_reports_unreachable_database() {
    let response = app().oneshot(get("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = body_json(response).await;
    assert_eq!(body["status"], "unhealthy");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let response = app().oneshot(get("/api/user")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers().get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");

    let body = body_json(response).await;
    assert!(body["error"]["message"].is_string());
}

#[tokio::test]
async fn test_garbage_token_is_unauthorized() {
    let request = Request::builder()
        .uri("/api/notifications")
        .header(header::AUTHORIZATION, "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_invalid_token_on_public_listing_is_unauthorized() {
    let request = Request::builder()
        .uri("/api/events")
        .header(header::AUTHORIZATION, "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_rejects_short_password_before_provider_call() {
    let response = app()
        .oneshot(post_json(
            "/api/auth/register",
            json!({ "email": "grad@example.edu", "password": "short" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_legacy_register_requires_full_name() {
    let response = app()
        .oneshot(post_json(
            "/api/register",
            json!({ "email": "grad@example.edu", "password": "long-enough-password", "full_name": "  " }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "invalid_input");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Email, password, and full name are required"));
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let request = Request::builder()
        .uri("/api")
        .header("x-request-id", "req-42")
        .body(Body::empty())
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.headers().get("x-request-id").unwrap(), "req-42");

    let response = app().oneshot(get("/api")).await.unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_rate_limit_per_client() {
    let mut settings = test_settings("http://127.0.0.1:1");
    settings.rate_limit.enabled = true;
    settings.rate_limit.requests_per_minute = 1;
    settings.rate_limit.burst = 2;
    let app = alumni_portal::router(lazy_state(settings));

    let from = |ip: &str| {
        Request::builder()
            .uri("/api")
            .header("x-forwarded-for", ip)
            .body(Body::empty())
            .unwrap()
    };

    for _ in 0..2 {
        let response = app.clone().oneshot(from("203.0.113.7")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.clone().oneshot(from("203.0.113.7")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let response = app.oneshot(from("198.51.100.1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let response = app().oneshot(get("/api/does-not-exist")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

async fn assert_invalid_input_envelope(response: axum::response::Response) {
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let content_type = response.headers().get(header::CONTENT_TYPE).unwrap().to_str().unwrap();
    assert!(content_type.starts_with("application/json"));

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "invalid_input");
    assert!(body["error"]["message"].is_string());
}

#[tokio::test]
async fn test_bad_path_segment_uses_error_envelope() {
    let response = app().oneshot(get("/api/profiles/not-a-uuid")).await.unwrap();
    assert_invalid_input_envelope(response).await;
}

#[tokio::test]
async fn test_malformed_json_body_uses_error_envelope() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/feedback")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_invalid_input_envelope(response).await;
}

#[tokio::test]
async fn test_bad_query_string_uses_error_envelope() {
    let response = app().oneshot(get("/api/jobs?limit=abc")).await.unwrap();
    assert_invalid_input_envelope(response).await;
}
