// API Module
//
// Router, shared state and the service endpoints (health, metrics).

pub mod types;
pub mod helpers;
pub mod addresses;

use std::sync::Arc;

use axum::{http::StatusCode, routing::get, Extension, Json, Router};
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;
use crate::metrics::gather_metrics;
use crate::sources::Transport;

pub use addresses::*;
pub use helpers::*;
pub use types::*;

/// Read-only state shared by all handlers.
pub struct AppState {
    pub config: AppConfig,
    pub transport: Arc<dyn Transport>,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/{address}", get(address_default))
        .route("/{address}/{currency}", get(address_with_currency))
        .layer(Extension(state))
        .layer(cors)
}

pub async fn health_handler() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
    })
}

/// GET /metrics
/// Prometheus text exposition format
pub async fn metrics_handler() -> Result<String, (StatusCode, Json<ApiError>)> {
    gather_metrics().map_err(|e| internal_error(format!("Failed to encode metrics: {}", e)))
}
