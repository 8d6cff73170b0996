//! HTTP and WebSocket surface
//!
//! The API routes live with the overlay; this module adds the event stream
//! and health check, and assembles the router.

pub mod websocket;

pub use websocket::{AppState, ws_handler};

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::overlay::overlay_routes;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub image_loaded: bool,
    pub websocket_connections: usize,
}

/// GET /health - Liveness and a glimpse of the overlay state
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let image_loaded = state.overlay.controller.lock().await.image().is_some();

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        image_loaded,
        websocket_connections: state.connection_count(),
    })
}

/// Router with `/health`, `/ws` and the overlay API under `/api`
pub fn app_router(state: AppState) -> Router {
    let api = overlay_routes(state.overlay.clone());

    Router::new()
        .route("/health", get(health))
        .route("/ws", get(ws_handler))
        .with_state(state)
        .nest("/api", api)
}
