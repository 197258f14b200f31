//! In-process router tests. The pool connects lazily, so only routes that
//! never reach the database are exercised here.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use gearguard_server::{
    api, config::AppConfig, lifecycle::SystemClock, models::user::UserClaims, AppState,
};

fn app() -> Router {
    let config = AppConfig::default();
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect_lazy(&config.database.url)
        .expect("lazy pool");
    api::router(AppState::new(config, pool, Arc::new(SystemClock)))
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.expect("router call");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn health_is_public() {
    let request = Request::builder().uri("/api/v1/health").body(Body::empty()).expect("req");
    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn dashboard_requires_token() {
    let request = Request::builder().uri("/api/v1/dashboard").body(Body::empty()).expect("req");
    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "NotAuthorized");
    assert_eq!(body["code"], 2);
}

#[tokio::test]
async fn token_signed_with_other_secret_is_rejected() {
    let now = Utc::now();
    let claims = UserClaims {
        sub: "jane.smith".to_string(),
        user_id: 7,
        name: "Jane Smith".to_string(),
        exp: (now + Duration::hours(1)).timestamp(),
        iat: now.timestamp(),
    };
    let token = claims.create_token("not-the-server-secret").expect("token");

    let request = Request::builder()
        .uri("/api/v1/kanban")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .expect("req");
    let (status, _) = send(app(), request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn stage_endpoint_rejects_other_methods() {
    for method in ["GET", "PUT", "DELETE"] {
        let request = Request::builder()
            .method(method)
            .uri("/api/v1/requests/5/stage")
            .body(Body::empty())
            .expect("req");
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{}", method);
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "Invalid method");
    }
}

#[tokio::test]
async fn openapi_document_lists_stage_endpoint() {
    let request = Request::builder().uri("/api-docs/openapi.json").body(Body::empty()).expect("req");
    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"].get("/requests/{id}/stage").is_some());
    assert!(body["components"]["securitySchemes"].get("bearer_auth").is_some());
}
