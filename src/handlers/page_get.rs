use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use tracing::debug;
use uuid::Uuid;

use crate::auth::access;
use crate::models::{ErrorResponse, Page, Role};
use crate::services::auth_service::AuthCtx;
use crate::state::AppState;

fn error_response(status: StatusCode, error: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            code: status.as_u16(),
            status: status.to_string(),
            error: error.into(),
        }),
    )
}

/// Fetch a page, the REST counterpart of the document load a `join-page`
/// performs. Requires at least viewer access.
pub async fn page_get(
    Path(page_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthCtx>,
) -> Result<Json<Page>, (StatusCode, Json<ErrorResponse>)> {
    debug!("Page fetch requested: {}", page_id);

    let page = state
        .store
        .find_page(page_id)
        .await
        .map_err(|e| error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .ok_or_else(|| {
            error_response(StatusCode::NOT_FOUND, format!("Page '{}' not found", page_id))
        })?;

    access::ensure_page_access(&page, ctx.user_id, Role::Viewer)
        .map_err(|e| error_response(StatusCode::FORBIDDEN, e.to_string()))?;

    Ok(Json(page))
}
