use std::sync::Arc;

use axum::{middleware, routing::get, Router};

use crate::handlers::{diagnostics, health_check, page_get, ready_check};
use crate::routes::auth_middleware::auth_middleware;
use crate::state::AppState;

/// Create API routes
pub fn create_api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/diagnostics", get(diagnostics))
        .route("/v1/pages/:page_id", get(page_get))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        )) // Applies to all routes added above
        .route("/v1/health", get(health_check))
        .route("/v1/ready", get(ready_check))
        .with_state(state)
}
