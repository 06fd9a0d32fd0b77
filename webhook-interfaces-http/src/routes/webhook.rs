use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{middleware, Router};

use webhook_application::AppState;

use crate::handlers::{health_handlers, webhook_handlers};
use crate::middleware::{enforce_rate_limit, log_webhook_requests};

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_body_bytes.saturating_add(1);

    let webhook_routes = Router::new()
        .route("/webhook/:provider/", post(webhook_handlers::receive_webhook))
        .route("/webhook/:provider", post(webhook_handlers::receive_webhook))
        .layer(DefaultBodyLimit::max(body_limit))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            enforce_rate_limit,
        ));

    Router::new()
        .route("/health/", get(health_handlers::health_live))
        .route("/health", get(health_handlers::health_live))
        .route("/health/ready", get(health_handlers::health_ready))
        .route("/metrics", get(health_handlers::metrics_prometheus))
        .merge(webhook_routes)
        .layer(middleware::from_fn(log_webhook_requests))
        .with_state(state)
}
