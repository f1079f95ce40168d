//! Ticketflow Management API
//!
//! REST surface for managing automation rules, dry-running them against
//! tickets, and feeding lifecycle events into the engine.

pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn create_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Rules
        .route("/api/rules", post(handlers::create_rule).get(handlers::list_rules))
        .route(
            "/api/rules/:id",
            get(handlers::get_rule)
                .put(handlers::update_rule)
                .delete(handlers::delete_rule),
        )
        .route("/api/rules/:id/toggle", post(handlers::toggle_rule))
        .route("/api/rules/:id/test", post(handlers::test_rule))
        // Templates
        .route("/api/templates", get(handlers::list_templates))
        .route("/api/templates/:key/clone", post(handlers::clone_template))
        // Engine
        .route("/api/events", post(handlers::ingest_event))
        .route("/api/stats", get(handlers::engine_stats))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
