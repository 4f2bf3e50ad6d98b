//! # Tests for Handlers
//!
//! Router-level tests for the service endpoints and admin session handling.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
    response::Json,
};
use migration::{Migrator, MigratorTrait};
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::config::AppConfig;
use crate::handlers::root;
use crate::server::{AppState, create_app};

fn test_config() -> AppConfig {
    AppConfig {
        profile: "test".to_string(),
        admin_password: Some("back-office".to_string()),
        admin_session_secret: Some("s".repeat(32)),
        user_jwt_secret: Some("u".repeat(32)),
        ..Default::default()
    }
}

async fn test_app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    create_app(AppState::new(Arc::new(test_config()), db))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_root_handler_returns_expected_service_info() {
    let Json(service_info) = root().await;

    assert_eq!(service_info.service, "impact-directory");
    assert_eq!(service_info.version, env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = test_app().await;

    let (status, body) = send(
        app.clone(),
        Request::builder().uri("/healthz").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, _) = send(
        app,
        Request::builder().uri("/readyz").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_login_and_session_probe() {
    let app = test_app().await;

    let (status, body) = send(
        app.clone(),
        json_request("POST", "/api/admin/auth", json!({ "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, body) = send(
        app.clone(),
        json_request("POST", "/api/admin/auth", json!({ "password": "back-office" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let token = body["token"].as_str().unwrap().to_string();

    let (_, body) = send(
        app.clone(),
        Request::builder()
            .uri("/api/admin/session")
            .header("Authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(body["authenticated"], true);

    let (_, body) = send(
        app.clone(),
        Request::builder()
            .uri("/api/admin/session")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(body["authenticated"], false);

    let (status, body) = send(
        app,
        Request::builder()
            .method("POST")
            .uri("/api/admin/logout")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_malformed_json_uses_error_envelope() {
    let app = test_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/admin/auth")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");
    assert!(body["trace_id"].is_string());
}

#[tokio::test]
async fn test_unknown_reference_kind_is_not_found() {
    let app = test_app().await;

    let (status, body) = send(
        app,
        Request::builder()
            .uri("/api/projects")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_malformed_submission_id_is_bad_request() {
    let app = test_app().await;

    let login = send(
        app.clone(),
        json_request("POST", "/api/admin/auth", json!({ "password": "back-office" })),
    )
    .await
    .1;
    let token = login["token"].as_str().unwrap();

    let (status, body) = send(
        app,
        Request::builder()
            .uri("/api/submissions/not-a-uuid")
            .header("Authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn test_openapi_document_lists_workflow_routes() {
    let app = test_app().await;

    let (status, body) = send(
        app,
        Request::builder()
            .uri("/openapi.json")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let paths = body["paths"].as_object().unwrap();
    for path in [
        "/api/submissions",
        "/api/submissions/my",
        "/api/submissions/pending",
        "/api/submissions/{id}",
        "/api/submissions/{id}/approve",
        "/api/submissions/{id}/reject",
    ] {
        assert!(paths.contains_key(path), "missing {path}");
    }
}
