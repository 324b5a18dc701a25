use utoipa::OpenApi;

use crate::models::{DiagnosticsResponse, ErrorResponse, HealthResponse, ReadyResponse};

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
#[allow(dead_code)]
pub async fn health_check_doc() {}

/// Readiness check endpoint
#[utoipa::path(
    get,
    path = "/api/v1/ready",
    responses(
        (status = 200, description = "Service is ready", body = ReadyResponse)
    )
)]
#[allow(dead_code)]
pub async fn ready_check_doc() {}

/// Runtime diagnostics
#[utoipa::path(
    get,
    path = "/api/v1/diagnostics",
    responses(
        (status = 200, description = "Runtime diagnostics", body = DiagnosticsResponse),
        (status = 403, description = "Platform admin access required", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn diagnostics_doc() {}

#[derive(OpenApi)]
#[openapi(
    paths(health_check_doc, ready_check_doc, diagnostics_doc),
    components(schemas(HealthResponse, ReadyResponse, DiagnosticsResponse, ErrorResponse)),
    tags(
        (name = "pagecraft-collab", description = "Collaborative page builder API")
    )
)]
pub struct ApiDoc;
