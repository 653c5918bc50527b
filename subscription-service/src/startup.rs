//! Application startup and lifecycle management.

use crate::config::SubscriptionConfig;
use crate::handlers::{cost, subscriptions};
use crate::services::{
    get_metrics, init_metrics, PgSubscriptionRepository, SubscriptionRepository,
    SubscriptionService,
};
use crate::ApiDoc;
use axum::{
    extract::State,
    http::{Request, StatusCode},
    middleware,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use service_core::error::AppError;
use service_core::middleware::metrics::metrics_middleware;
use service_core::middleware::tracing::{request_id_middleware, REQUEST_ID_HEADER};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

const SERVICE_NAME: &str = "subscription-service";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub service: SubscriptionService,
}

impl AppState {
    pub fn new(repo: Arc<dyn SubscriptionRepository>) -> Self {
        Self {
            service: SubscriptionService::new(repo),
        }
    }
}

/// Health check endpoint for Docker/K8s liveness probes.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.service.repository().health_check().await {
        Ok(_) => {
            tracing::debug!("Health check passed");
            (
                StatusCode::OK,
                Json(json!({
                    "status": "ok",
                    "service": SERVICE_NAME,
                    "version": env!("CARGO_PKG_VERSION")
                })),
            )
        }
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed - store unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "service": SERVICE_NAME
                })),
            )
        }
    }
}

/// Readiness check endpoint for K8s readiness probes.
async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.service.repository().health_check().await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Metrics endpoint for Prometheus scraping.
async fn metrics_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        get_metrics(),
    )
}

/// Full HTTP surface: `/api/v1` resources, ops endpoints and API docs.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/subscriptions",
            get(subscriptions::list_subscriptions).post(subscriptions::create_subscription),
        )
        .route(
            "/subscriptions/:id",
            get(subscriptions::get_subscription)
                .put(subscriptions::update_subscription)
                .delete(subscriptions::delete_subscription),
        )
        .route("/cost", get(cost::calculate_total_cost));

    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics_handler))
        .nest("/api/v1", api)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
            let request_id = request
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|value| value.to_str().ok())
                .unwrap_or("-");

            tracing::info_span!(
                "http_request",
                request_id = %request_id,
                method = %request.method(),
                uri = %request.uri(),
            )
        }))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Connect to PostgreSQL, apply migrations and bind the listener.
    pub async fn build(config: SubscriptionConfig) -> Result<Self, AppError> {
        let repo = PgSubscriptionRepository::connect(
            &config.database.url,
            config.database.max_connections,
            config.database.min_connections,
        )
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to connect to PostgreSQL");
            e
        })?;

        repo.run_migrations().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to run migrations");
            e
        })?;

        Self::build_with_repository(config, Arc::new(repo)).await
    }

    /// Bind the listener around an already constructed store.
    pub async fn build_with_repository(
        config: SubscriptionConfig,
        repo: Arc<dyn SubscriptionRepository>,
    ) -> Result<Self, AppError> {
        init_metrics();

        let addr = config.common.socket_addr()?;
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!(error = %e, addr = %addr, "Failed to bind HTTP listener");
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(http_port = port, "Subscription service listener bound");

        Ok(Self {
            port,
            listener,
            state: AppState::new(repo),
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);

        tracing::info!(
            service = SERVICE_NAME,
            version = env!("CARGO_PKG_VERSION"),
            http_port = self.port,
            "Service ready to accept connections"
        );

        axum::serve(self.listener, router).await
    }
}
