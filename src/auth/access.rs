use axum::{http::StatusCode, Json};

use crate::models::{CollabError, ErrorResponse, Page, Role};
use crate::services::auth_service::AuthCtx;
use uuid::Uuid;

const PLATFORM_ADMIN_ROLE: &str = "platform-admin";

pub fn is_platform_admin(ctx: &AuthCtx) -> bool {
    ctx.roles.iter().any(|r| r == PLATFORM_ADMIN_ROLE)
}

/// Gate consulted before every mutating protocol event and before read-only
/// joins (which require at least viewer). Pure; no side effects.
pub fn ensure_page_access(page: &Page, user_id: Uuid, required: Role) -> Result<(), CollabError> {
    if page.has_access(user_id, required) {
        Ok(())
    } else {
        Err(CollabError::AccessDenied(required))
    }
}

/// REST-side admin gate, used by the diagnostics endpoint.
pub fn ensure_platform_admin(ctx: &AuthCtx) -> Result<(), (StatusCode, Json<ErrorResponse>)> {
    if is_platform_admin(ctx) {
        return Ok(());
    }

    let status = StatusCode::FORBIDDEN;
    Err((
        status,
        Json(ErrorResponse {
            code: status.as_u16(),
            status: status.to_string(),
            error: "Platform admin access required".to_string(),
        }),
    ))
}
