use axum::http::{Method, StatusCode};
use classgate::api::ErrorBody;
use classgate::api::handlers::pagination::PaginatedResponse;
use classgate::auth::{Role, User};

use crate::support::{read_json, send_request, setup_test_app};

#[tokio::test]
async fn list_users_paginates() {
    let app = setup_test_app().await;
    let (_, token) = app.login_as("admin@example.com", Role::Admin).await;
    for i in 0..4 {
        app.create_user(&format!("student{}@example.com", i), Role::Student).await;
    }

    let response = send_request(
        &app,
        Method::GET,
        "/api/admin/users?limit=2&offset=1",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let page: PaginatedResponse<User> = read_json(response).await;
    assert_eq!(page.total, 5);
    assert_eq!(page.limit, 2);
    assert_eq!(page.offset, 1);
    assert_eq!(page.items.len(), 2);
}

#[tokio::test]
async fn get_user_returns_profile_or_404() {
    let app = setup_test_app().await;
    let (_, token) = app.login_as("admin@example.com", Role::Admin).await;
    let teacher = app.create_user("teacher@example.com", Role::Teacher).await;

    let response = send_request(
        &app,
        Method::GET,
        &format!("/api/admin/users/{}", teacher.id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = read_json(response).await;
    assert_eq!(body["email"], "teacher@example.com");
    assert!(body.get("passwordHash").is_none());

    let response =
        send_request(&app, Method::GET, "/api/admin/users/does-not-exist", Some(&token), None)
            .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: ErrorBody = read_json(response).await;
    assert_eq!(body.error, "not_found");
    assert_eq!(body.message, "User with ID 'does-not-exist' not found");
}

#[tokio::test]
async fn delete_user_then_404() {
    let app = setup_test_app().await;
    let (_, token) = app.login_as("admin@example.com", Role::Admin).await;
    let student = app.create_user("student@example.com", Role::Student).await;
    let path = format!("/api/admin/users/{}", student.id);

    let response = send_request(&app, Method::DELETE, &path, Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send_request(&app, Method::DELETE, &path, Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: ErrorBody = read_json(response).await;
    assert_eq!(body.message, format!("User with ID '{}' not found", student.id));
}

#[tokio::test]
async fn admin_cannot_delete_self() {
    let app = setup_test_app().await;
    let (admin, token) = app.login_as("admin@example.com", Role::Admin).await;

    let response = send_request(
        &app,
        Method::DELETE,
        &format!("/api/admin/users/{}", admin.id),
        Some(&token),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
