use std::env;

use axum::{body::Body, http::Request, http::StatusCode, routing::get, Router};
use quiz_admin_backend::middleware::auth;
use quiz_admin_backend::models::user::UserRole;
use quiz_admin_backend::services::auth_service::AuthService;
use tower::ServiceExt;

fn init_test_config() {
    env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    env::set_var("DATABASE_URL", "postgres://localhost/unused");
    env::set_var("JWT_SECRET", "test_secret_key");
    env::set_var("FRONTEND_URL", "http://localhost:3000");
    let _ = quiz_admin_backend::config::init_config();
}

fn protected_app() -> Router {
    Router::new()
        .route("/protected", get(|| async { "ok" }))
        .layer(axum::middleware::from_fn(auth::require_superadmin))
}

#[tokio::test]
async fn superadmin_guard_enforces_token_and_role() {
    init_test_config();
    let app = protected_app();

    // No Authorization header.
    let req = Request::builder()
        .uri("/protected")
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Garbage token.
    let req = Request::builder()
        .uri("/protected")
        .header("authorization", "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Valid token, wrong role.
    let admin_token = AuthService::issue_token("admin@example.com", UserRole::Admin).unwrap();
    let req = Request::builder()
        .uri("/protected")
        .header("authorization", format!("Bearer {}", admin_token))
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Valid superadmin token.
    let token = AuthService::issue_token("root@example.com", UserRole::Superadmin).unwrap();
    let req = Request::builder()
        .uri("/protected")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn bearer_guard_accepts_any_valid_role() {
    init_test_config();
    let app = Router::new()
        .route("/me", get(|| async { "ok" }))
        .layer(axum::middleware::from_fn(auth::require_bearer_auth));

    let token = AuthService::issue_token("admin@example.com", UserRole::Admin).unwrap();
    let req = Request::builder()
        .uri("/me")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let req = Request::builder().uri("/me").body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
