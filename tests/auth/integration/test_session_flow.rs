use axum::http::{Method, StatusCode};
use classgate::api::ErrorBody;
use classgate::auth::{AuthResponse, Role, UserProfile};
use serde_json::json;

use crate::support::{read_json, send_request, setup_test_app, PASSWORD};

#[tokio::test]
async fn register_login_me_logout() {
    let app = setup_test_app().await;

    let response = send_request(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "name": "Grace Hopper",
            "email": "Grace@Example.com",
            "password": "compiler-pioneer",
            "role": "Teacher"
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let registered: AuthResponse = read_json(response).await;
    assert_eq!(registered.user.email, "grace@example.com");
    assert_eq!(registered.user.role, Role::Teacher);

    let response = send_request(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "grace@example.com", "password": "compiler-pioneer" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let login: AuthResponse = read_json(response).await;
    assert!(login.expires_at > chrono::Utc::now());

    let response =
        send_request(&app, Method::GET, "/api/auth/me", Some(&login.token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let profile: UserProfile = read_json(response).await;
    assert_eq!(profile.id, registered.user.id);

    let response =
        send_request(&app, Method::POST, "/api/auth/logout", Some(&login.token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = read_json(response).await;
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn register_accepts_padded_email() {
    let app = setup_test_app().await;

    let response = send_request(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "name": "Ada Lovelace",
            "email": "  Ada@Example.com ",
            "password": "analytical-engine"
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let registered: AuthResponse = read_json(response).await;
    assert_eq!(registered.user.email, "ada@example.com");

    let response = send_request(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": " ADA@example.com", "password": "analytical-engine" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn register_defaults_to_student() {
    let app = setup_test_app().await;

    let response = send_request(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "name": "Sam", "email": "sam@example.com", "password": "long-enough" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: AuthResponse = read_json(response).await;
    assert_eq!(body.user.role, Role::Student);
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let app = setup_test_app().await;
    app.create_user("dup@example.com", Role::Host).await;

    let response = send_request(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "name": "Dup", "email": "DUP@example.com", "password": "long-enough" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn self_registration_cannot_create_admin() {
    let app = setup_test_app().await;

    let response = send_request(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "name": "Mallory",
            "email": "mallory@example.com",
            "password": "long-enough",
            "role": "admin"
        })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalid_bodies_are_bad_requests() {
    let app = setup_test_app().await;

    let response = send_request(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "name": "X", "email": "not-an-email", "password": "short" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = read_json(response).await;
    assert_eq!(body.error, "bad_request");

    let response = send_request(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "name": "X", "email": "x@example.com", "password": "long-enough", "role": "janitor" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response =
        send_request(&app, Method::POST, "/api/auth/login", None, Some(json!({ "email": 5 })))
            .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn wrong_password_and_unknown_email_share_a_message() {
    let app = setup_test_app().await;
    app.create_user("ada@example.com", Role::Student).await;

    let wrong_password = send_request(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "ada@example.com", "password": "not-the-password" })),
    )
    .await;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    let wrong_password: ErrorBody = read_json(wrong_password).await;

    let unknown = send_request(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "nobody@example.com", "password": PASSWORD })),
    )
    .await;
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    let unknown: ErrorBody = read_json(unknown).await;

    assert_eq!(wrong_password.message, unknown.message);
}
