use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Response for diagnostics information
#[derive(Serialize, Deserialize, ToSchema)]
pub struct DiagnosticsResponse {
    /// Open page rooms with at least one subscriber
    pub n_rooms: u32,
    /// Presence entries across all rooms
    pub n_presence: u32,
    /// Pages held by the store
    pub n_pages: u32,
    /// Cached user contexts
    pub n_user_ctx: u32,
    pub cpu_usage: f32,
    pub memory_alloc: u64,
    pub memory_total: u64,
    pub memory_free: u64,
}
