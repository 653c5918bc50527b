//! Health check integration tests for subscription-service.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::TestApp;
use std::sync::Arc;
use subscription_service::config::{DatabaseConfig, SubscriptionConfig};
use subscription_service::services::InMemorySubscriptionRepository;
use subscription_service::startup::Application;
use tower::util::ServiceExt;

#[tokio::test]
async fn health_check_works() {
    let app = TestApp::new();

    let (status, body) = app.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "subscription-service");
}

#[tokio::test]
async fn readiness_check_works() {
    let app = TestApp::new();

    let (status, _) = app.get("/ready").await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn metrics_endpoint_works() {
    let app = TestApp::new();
    // Populate the counters first.
    app.get("/api/v1/subscriptions").await;

    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert!(response.status().is_success());
    assert!(response
        .headers()
        .get("content-type")
        .map(|v| v.to_str().unwrap_or("").contains("text/plain"))
        .unwrap_or(false));
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = TestApp::new();

    let (status, body) = app.get("/api-docs/openapi.json").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/v1/cost"].is_object());
    assert!(body["paths"]["/api/v1/subscriptions/{id}"].is_object());
}

#[tokio::test]
async fn application_binds_random_port() {
    let mut config = SubscriptionConfig {
        common: Default::default(),
        service_name: "subscription-service-test".to_string(),
        service_version: "0.1.0".to_string(),
        log_level: "warn".to_string(),
        otlp_endpoint: None,
        database: DatabaseConfig {
            url: "postgres://unused".to_string(),
            max_connections: 1,
            min_connections: 1,
        },
    };
    config.common.host = "127.0.0.1".to_string();
    config.common.port = 0;

    let app = Application::build_with_repository(
        config,
        Arc::new(InMemorySubscriptionRepository::new()),
    )
    .await
    .expect("Failed to build application");

    assert_ne!(app.port(), 0);
}
