//! Router configuration for the campaign dashboard API

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::AppState;

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/health", get(handlers::health))
        .route("/ready", get(handlers::ready))
        // Directory
        .route("/api/v1/dashboard", get(handlers::dashboard))
        .route("/api/v1/campaigns", get(handlers::list_campaigns))
        .route("/api/v1/campaigns/{id}", get(handlers::get_campaign))
        // Live detail views
        .route(
            "/api/v1/campaigns/{id}/live",
            post(handlers::open_live)
                .get(handlers::get_live)
                .delete(handlers::close_live),
        )
        .with_state(state)
}
