use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use tracing::error;

use crate::services::auth_service::{auth_ctx_from_token, token_from_headers};
use crate::state::AppState;

/// Request authentication for the HTTP API.
///
/// Validates the JWT from the Authorization header or auth cookie and puts
/// the resulting [`AuthCtx`](crate::services::auth_service::AuthCtx) into the
/// request extensions for downstream handlers.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // 1. Get the auth token from the request
    let token = match token_from_headers(req.headers()) {
        Some(token) => token,
        None => return Err(StatusCode::UNAUTHORIZED),
    };

    // 2. Validate it against the configured secret
    let secret = match &state.config.auth_jwt_secret {
        Some(secret) => secret,
        None => {
            error!("Auth JWT secret not configured");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };
    let ctx = match auth_ctx_from_token(&token, secret) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("JWT validation failed: {}", e);
            return Err(StatusCode::UNAUTHORIZED);
        }
    };

    // 3. Expose the identity to downstream handlers
    req.extensions_mut().insert(ctx);

    Ok(next.run(req).await)
}
