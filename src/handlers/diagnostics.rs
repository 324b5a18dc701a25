use std::sync::{Arc, Mutex, OnceLock};

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use sysinfo::System;
use tracing::info;

use crate::auth::access;
use crate::models::{DiagnosticsResponse, ErrorResponse};
use crate::services::auth_service::AuthCtx;
use crate::state::AppState;

static SYSTEM_MONITOR: OnceLock<Mutex<System>> = OnceLock::new();

/// Runtime diagnostics: room/presence/store counts plus system stats.
pub async fn diagnostics(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthCtx>,
) -> Result<(StatusCode, Json<DiagnosticsResponse>), (StatusCode, Json<ErrorResponse>)> {
    access::ensure_platform_admin(&ctx)?;

    let n_rooms = state.rooms.room_count().await as u32;
    let n_presence = state.presence.entry_count().await as u32;
    let n_pages = state.store.page_count().await as u32;
    let n_user_ctx = state.user_ctx.entry_count() as u32;

    // System stats
    let (cpu_usage, memory_alloc, memory_free, memory_total) = {
        let sys_lock = SYSTEM_MONITOR.get_or_init(|| Mutex::new(System::new_all()));
        match sys_lock.lock() {
            Ok(mut sys) => {
                sys.refresh_cpu();
                sys.refresh_memory();
                (
                    sys.global_cpu_info().cpu_usage(),
                    sys.used_memory(),
                    sys.free_memory(),
                    sys.total_memory(),
                )
            }
            Err(_) => (0.0, 0, 0, 0),
        }
    };

    info!(
        "Diagnostics: CPU: {:.2}%, Mem: {}/{} MB (Free: {} MB), Rooms: {}, Presence: {}",
        cpu_usage,
        memory_alloc / 1024 / 1024,
        memory_total / 1024 / 1024,
        memory_free / 1024 / 1024,
        n_rooms,
        n_presence
    );

    Ok((
        StatusCode::OK,
        Json(DiagnosticsResponse {
            n_rooms,
            n_presence,
            n_pages,
            n_user_ctx,
            cpu_usage,
            memory_alloc,
            memory_total,
            memory_free,
        }),
    ))
}
