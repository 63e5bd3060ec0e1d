use axum::http::{Method, StatusCode};
use classgate::api::ErrorBody;
use classgate::auth::Role;

use crate::support::{read_json, send_request, send_with_authorization, setup_test_app};

#[tokio::test]
async fn missing_header_is_unauthorized() {
    let app = setup_test_app().await;

    let response = send_request(&app, Method::GET, "/api/auth/me", None, None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: ErrorBody = read_json(response).await;
    assert_eq!(body.error, "unauthorized");
}

#[tokio::test]
async fn malformed_headers_are_unauthorized() {
    let app = setup_test_app().await;

    for header in ["Bearer", "Bearer ", "Basic dXNlcjpwYXNz", "token-without-scheme"] {
        let response = send_with_authorization(&app, "/api/auth/me", header).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "header {header:?}");
    }
}

#[tokio::test]
async fn garbage_token_is_unauthorized() {
    let app = setup_test_app().await;

    let response =
        send_request(&app, Method::GET, "/api/auth/me", Some("not.a.jwt"), None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn scheme_is_case_insensitive() {
    let app = setup_test_app().await;
    let (_, token) = app.login_as("ada@example.com", Role::Student).await;

    let response =
        send_with_authorization(&app, "/api/auth/me", &format!("bearer {}", token)).await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn deleted_identity_with_valid_token_is_unauthorized() {
    let app = setup_test_app().await;
    let (admin, admin_token) = app.login_as("admin@example.com", Role::Admin).await;
    let (student, student_token) = app.login_as("student@example.com", Role::Student).await;
    assert_ne!(admin.id, student.id);

    let response = send_request(
        &app,
        Method::DELETE,
        &format!("/api/admin/users/{}", student.id),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response =
        send_request(&app, Method::GET, "/api/auth/me", Some(&student_token), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: ErrorBody = read_json(response).await;
    assert!(body.message.contains("user not found"));
}

#[tokio::test]
async fn public_routes_need_no_token() {
    let app = setup_test_app().await;

    let response = send_request(&app, Method::GET, "/health", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = read_json(response).await;
    assert_eq!(body["status"], "ok");
}
