mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{call, login, login_admin, register, rpc, seeded_app};
use http_body_util::BodyExt;
use serde_json::json;
use sipkl::router::init_router;
use tower::ServiceExt;

#[tokio::test]
async fn test_missing_or_unknown_token_expires_session() {
    let app = seeded_app().await;

    let body = rpc(&app, "getDashboardData", json!({})).await;
    assert_eq!(
        body,
        json!({
            "success": false,
            "error": "Session expired. Please log in again.",
            "sessionExpired": true,
        })
    );

    let body = call(&app, "not-a-token", "getAdminUsers", json!({})).await;
    assert_eq!(body["sessionExpired"], true);
}

#[tokio::test]
async fn test_unknown_action() {
    let app = seeded_app().await;
    let token = login_admin(&app, "admin").await;

    let body = call(&app, &token, "dropEverything", json!({})).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Unknown API action: dropEverything");
}

#[tokio::test]
async fn test_students_cannot_call_admin_actions() {
    let app = seeded_app().await;
    register(&app, "00123", "budi", "tjkt").await;
    let token = login(&app, "00123", "rahasia").await;

    for action in ["getAdminUsers", "getAdminStats", "adminResetPassword", "adminExportSheet"] {
        let body = call(&app, &token, action, json!({"identifier": "admin"})).await;
        assert_eq!(body["success"], false, "{}", action);
        assert_eq!(body["error"], "Access denied", "{}", action);
    }
}

#[tokio::test]
async fn test_validation_errors_are_reported_in_envelope() {
    let app = seeded_app().await;

    let body = rpc(&app, "login", json!({"password": "x"})).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "identifier is required");

    let token = login_admin(&app, "admin").await;
    let body = call(&app, &token, "changePassword", json!({"newPassword": ""})).await;
    assert_eq!(body["error"], "New password is required");
}

#[tokio::test]
async fn test_malformed_body_still_gets_envelope() {
    let app = seeded_app().await;
    let router = init_router(app.state.clone());

    let request = Request::builder()
        .method("POST")
        .uri("/api/rpc")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_health_and_docs_are_served() {
    let app = seeded_app().await;

    for uri in ["/health", "/api-docs/openapi.json"] {
        let router = init_router(app.state.clone());
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
    }
}

#[tokio::test]
async fn test_uploaded_photo_is_served_under_files() {
    let app = seeded_app().await;
    register(&app, "00123", "budi", "tjkt").await;
    let token = login(&app, "00123", "rahasia").await;

    let body = call(
        &app,
        &token,
        "uploadPhoto",
        json!({"fileData": "iVBORw0KGgo=", "fileType": "image/png"}),
    )
    .await;
    assert_eq!(body["success"], true, "{}", body);
    let file_id = body["fileId"].as_str().unwrap();
    assert!(body["thumbnailLink"].as_str().unwrap().ends_with(file_id));

    let router = init_router(app.state.clone());
    let request = Request::builder()
        .uri(format!("/files/{}", file_id))
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

async fn preflight(app: &common::TestApp, origin: &str) -> axum::http::HeaderMap {
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/rpc")
        .header("origin", origin)
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .body(Body::empty())
        .unwrap();
    let response = init_router(app.state.clone()).oneshot(request).await.unwrap();
    response.headers().clone()
}

#[tokio::test]
async fn test_cors_preflight_allows_configured_origin_only() {
    let app = seeded_app().await;

    let headers = preflight(&app, "http://localhost:5173").await;
    assert_eq!(
        headers["access-control-allow-origin"],
        "http://localhost:5173"
    );
    assert_eq!(headers["access-control-max-age"], "3600");

    let headers = preflight(&app, "http://evil.example").await;
    assert!(!headers.contains_key("access-control-allow-origin"));
}
