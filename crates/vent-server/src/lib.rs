//! Vent server library logic.
//!
//! A thin HTTP adapter over the core crates: inbound chat events go to
//! the session dispatcher, moderation and read endpoints map directly
//! onto the domain functions. The adapter owns no domain rules of its
//! own.

pub mod api;
pub mod api_audit;
pub mod api_events;
pub mod api_moderation;
pub mod api_profile;
pub mod api_vents;
pub mod config;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Extension, Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use vent_db::DbPool;
use vent_moderation::ModeratorRoster;
use vent_session::SessionStore;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: DbPool,
    /// Moderator roster from configuration.
    pub roster: Arc<ModeratorRoster>,
    /// Per-user conversation state arena.
    pub sessions: Arc<SessionStore>,
}

/// Maximum request body size (64 KiB) — everything here is short-form text.
const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;

/// Health check handler.
///
/// Returns `200 OK` with server status and version. Used by load
/// balancers, monitoring, and CI to verify the server is running.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/events", post(api_events::submit_event_handler))
        .route(
            "/api/moderation/review",
            post(api_moderation::review_handler),
        )
        .route("/api/moderation/queue", get(api_moderation::queue_handler))
        .route("/api/vents/{ventId}", get(api_vents::get_vent_handler))
        .route(
            "/api/vents/{ventId}/comments",
            get(api_vents::list_comments_handler),
        )
        .route(
            "/api/profile/{userId}",
            get(api_profile::get_profile_handler),
        )
        .route("/api/audit/events", get(api_audit::get_events_handler))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(Arc::new(state)))
}
