use axum::http::{Method, StatusCode};
use classgate::api::ErrorBody;
use classgate::auth::Role;

use crate::support::{read_json, send_request, setup_test_app};

#[tokio::test]
async fn non_admin_roles_are_forbidden_on_admin_routes() {
    let app = setup_test_app().await;

    for (email, role) in [
        ("host@example.com", Role::Host),
        ("teacher@example.com", Role::Teacher),
        ("student@example.com", Role::Student),
    ] {
        let (_, token) = app.login_as(email, role).await;
        let response =
            send_request(&app, Method::GET, "/api/admin/users", Some(&token), None).await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN, "role {role}");
        let body: ErrorBody = read_json(response).await;
        assert_eq!(body.error, "forbidden");
    }
}

#[tokio::test]
async fn unauthenticated_admin_route_is_401_not_403() {
    let app = setup_test_app().await;

    let response = send_request(&app, Method::GET, "/api/admin/users", None, None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_reaches_admin_routes() {
    let app = setup_test_app().await;
    let (_, token) = app.login_as("admin@example.com", Role::Admin).await;

    let response = send_request(&app, Method::GET, "/api/admin/users", Some(&token), None).await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn staff_overview_admits_staff_only() {
    let app = setup_test_app().await;

    for (email, role) in [
        ("admin@example.com", Role::Admin),
        ("host@example.com", Role::Host),
        ("teacher@example.com", Role::Teacher),
    ] {
        let (user, token) = app.login_as(email, role).await;
        let response =
            send_request(&app, Method::GET, "/api/host/overview", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::OK, "role {role}");

        let body: serde_json::Value = read_json(response).await;
        assert_eq!(body["userId"], user.id.as_str());
        assert_eq!(body["role"], role.as_str());
    }

    let (_, token) = app.login_as("student@example.com", Role::Student).await;
    let response = send_request(&app, Method::GET, "/api/host/overview", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn role_change_in_store_applies_on_next_request() {
    let app = setup_test_app().await;
    let (user, token) = app.login_as("promoted@example.com", Role::Student).await;

    sqlx::query("UPDATE users SET role = 'teacher' WHERE id = ?")
        .bind(user.id.as_str())
        .execute(&app.pool)
        .await
        .expect("update role");

    let response = send_request(&app, Method::GET, "/api/host/overview", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
}
