use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use classgate::auth::{JwtService, Role};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;

use crate::support::{send_request, setup_test_app, TEST_SECRET};

fn sign(claims: serde_json::Value, secret: &str) -> String {
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .expect("sign token")
}

#[tokio::test]
async fn token_signed_with_other_secret_is_rejected() {
    let app = setup_test_app().await;
    let user = app.create_user("ada@example.com", Role::Admin).await;

    let forged = JwtService::from_secret(b"some-other-secret-0123456789abcdef", Duration::hours(1))
        .issue_token(&user.id, Role::Admin)
        .expect("issue")
        .token;

    let response = send_request(&app, Method::GET, "/api/auth/me", Some(&forged), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let app = setup_test_app().await;
    let user = app.create_user("ada@example.com", Role::Student).await;

    let expired = app
        .jwt
        .issue_token_at(&user.id, user.role, Utc::now() - Duration::hours(25))
        .expect("issue")
        .token;

    let response = send_request(&app, Method::GET, "/api/auth/me", Some(&expired), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn swapped_signature_is_rejected() {
    let app = setup_test_app().await;
    let (_, student_token) = app.login_as("student@example.com", Role::Student).await;
    let (_, admin_token) = app.login_as("admin@example.com", Role::Admin).await;

    let (student_unsigned, _) = student_token.rsplit_once('.').expect("jwt");
    let (_, admin_signature) = admin_token.rsplit_once('.').expect("jwt");
    let tampered = format!("{}.{}", student_unsigned, admin_signature);

    let response = send_request(&app, Method::GET, "/api/auth/me", Some(&tampered), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn legacy_subject_claims_verify() {
    let app = setup_test_app().await;
    let user = app.create_user("legacy@example.com", Role::Host).await;
    let exp = (Utc::now() + Duration::hours(1)).timestamp();

    for claims in [
        json!({ "userId": user.id.as_str(), "exp": exp }),
        json!({ "id": user.id.as_str(), "exp": exp }),
    ] {
        let token = sign(claims, TEST_SECRET);
        let response = send_request(&app, Method::GET, "/api/auth/me", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn token_without_subject_is_rejected() {
    let app = setup_test_app().await;
    let exp = (Utc::now() + Duration::hours(1)).timestamp();
    let token = sign(json!({ "role": "admin", "exp": exp }), TEST_SECRET);

    let response = send_request(&app, Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_without_expiry_is_rejected() {
    let app = setup_test_app().await;
    let user = app.create_user("ada@example.com", Role::Student).await;
    let token = sign(json!({ "sub": user.id.as_str() }), TEST_SECRET);

    let response = send_request(&app, Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
