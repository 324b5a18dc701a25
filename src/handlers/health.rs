use axum::Json;
use tracing::debug;

use crate::models::{HealthResponse, ReadyResponse};

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    debug!("Health check requested");
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "Server is running".to_string(),
    })
}

/// Readiness check endpoint
pub async fn ready_check() -> Json<ReadyResponse> {
    debug!("Readiness check requested");
    // The store and registries are in-process; once the server is up it is
    // ready to accept connections.
    Json(ReadyResponse {
        status: "ok".to_string(),
        message: "Service is ready".to_string(),
    })
}
