mod auth;
mod config;
mod docs;
mod handlers;
mod models;
mod routes;
mod services;
mod state;
mod store;
mod websocket;
mod ws;

use std::panic;
use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use config::Config;
use docs::ApiDoc;
use routes::create_api_routes;
use state::AppState;
use websocket::handler::websocket_handler;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Set panic hook for better error messages
    panic::set_hook(Box::new(|info| {
        eprintln!("PANIC: {info}");
    }));

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            // Default to info level, but allow debug for our app
            "pagecraft_collab=debug,tower_http=debug,axum::rejection=trace,info".into()
        }))
        .init();

    info!("Starting server...");

    // Load configuration
    let app_config = Config::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        warn!("Using default configuration");
        Config::default()
    });
    if app_config.auth_jwt_secret.is_none() {
        warn!("No JWT secret configured - connections will be rejected");
    }

    // Process-wide services, injected into every handler
    let state = Arc::new(AppState::new(app_config.clone()));

    // Create API routes
    let api_routes = create_api_routes(state.clone());

    // Combine all routes
    let app_routes = Router::new()
        // Mount API routes
        .nest("/api", api_routes)
        // WebSocket endpoint for the collaboration protocol
        .route("/ws", get(websocket_handler).with_state(state.clone()))
        // Mount Swagger UI
        .merge(SwaggerUi::new("/swagger").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add tracing layer
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&app_config));

    // Start the HTTP server (WebSocket shares the same listener)
    let listener = tokio::net::TcpListener::bind(app_config.server_address())
        .await
        .unwrap_or_else(|_| panic!("Failed to bind to {}", app_config.server_address()));

    info!("🚀 Server running on http://{}", app_config.server_address());
    info!("📡 WebSocket available at ws://{}/ws", app_config.server_address());
    info!("📚 Swagger UI available at http://{}/swagger", app_config.server_address());

    axum::serve(listener, app_routes)
        .await
        .expect("Server failed to start");
}

fn cors_layer(config: &Config) -> CorsLayer {
    match &config.cors_origins {
        Some(origins) => {
            let parsed: Vec<axum::http::HeaderValue> = origins
                .split(',')
                .filter_map(|o| o.trim().parse().ok())
                .collect();
            CorsLayer::new().allow_origin(parsed)
        }
        None => CorsLayer::permissive(),
    }
}
