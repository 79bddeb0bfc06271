//! Health check endpoints

use crate::metrics::RouterMetrics;
use crate::nats::NatsDispatcher;
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Readiness check response
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
    pub nats_connected: bool,
    pub forwarded_total: u64,
    pub publish_failures: u64,
}

/// Application state for health endpoints
#[derive(Clone)]
pub struct AppState {
    pub nats: Arc<NatsDispatcher>,
    pub metrics: RouterMetrics,
}

/// Create the health check router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// Health endpoint - always returns 200 if process is running
async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Readiness endpoint - ready when the NATS dispatcher is connected
async fn ready_handler(State(state): State<AppState>) -> impl IntoResponse {
    let nats = &state.nats;
    let response = ReadyResponse::new(nats.is_connected(), nats.messages_published(), nats.publish_failures());

    if response.ready {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}

impl ReadyResponse {
    /// Ready exactly when the NATS connection is live
    pub fn new(nats_connected: bool, forwarded_total: u64, publish_failures: u64) -> Self {
        Self {
            ready: nats_connected,
            nats_connected,
            forwarded_total,
            publish_failures,
        }
    }
}

/// Metrics endpoint - returns Prometheus format metrics
async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    state.metrics.set_nats_connected(state.nats.is_connected());

    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "healthy",
            version: "0.1.0",
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("healthy"));
    }

    #[test]
    fn not_ready_while_nats_disconnected() {
        let response = ReadyResponse::new(false, 12, 1);
        assert!(!response.ready);
        assert!(!response.nats_connected);

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"ready\":false"));
        assert!(json.contains("\"forwarded_total\":12"));
    }

    #[test]
    fn ready_tracks_nats_connection() {
        let response = ReadyResponse::new(true, 0, 0);
        assert!(response.ready);
        assert!(response.nats_connected);
    }
}
