use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Liveness check response for the collaboration server.
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// "ok" while the process is serving.
    pub status: String,
    pub message: String,
}
