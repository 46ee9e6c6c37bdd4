mod handlers;
mod state;

use axum::routing::{get, post};
use axum::Router;
use state::AppState;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::config::AppConfig;

pub fn build_router(config: AppConfig) -> Router {
    let state = Arc::new(AppState::new(config));

    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/estimate", post(handlers::estimate))
        .route("/api/catalog", get(handlers::catalog))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start(config: AppConfig, host: &str, port: u16) {
    let app = build_router(config);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            error!("cannot bind to {}: {}", addr, e);
            eprintln!("Error: Cannot bind to {}: {}", addr, e);
            std::process::exit(1);
        });

    info!("listening on http://{}", addr);
    eprintln!("  sigorigin server listening on http://{}", addr);
    eprintln!("  Press Ctrl+C to stop.");

    axum::serve(listener, app)
        .await
        .unwrap_or_else(|e| {
            eprintln!("Server error: {}", e);
            std::process::exit(1);
        });
}
