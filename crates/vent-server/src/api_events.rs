//! Inbound chat-event endpoint.
//!
//! The transport collaborator posts every "user sent text" / "user
//! pressed button" event here and renders whatever effect comes back.

use crate::{api::ApiError, AppState};
use axum::{extract::Extension, Json};
use std::sync::Arc;
use vent_session::{handle_event, InboundEvent, Outbound};

/// Handler for `POST /api/events`.
///
/// Events for the same user are serialised by the session store, so the
/// transport may post concurrently without interleaving a user's flow.
pub async fn submit_event_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(inbound): Json<InboundEvent>,
) -> Result<Json<Outbound>, ApiError> {
    let outbound = tokio::task::spawn_blocking(move || {
        let conn = state
            .pool
            .get()
            .map_err(|e| ApiError::InternalServerError(format!("db connection failed: {e}")))?;
        handle_event(&conn, &state.sessions, &inbound).map_err(ApiError::from)
    })
    .await
    .map_err(|e| ApiError::InternalServerError(format!("task join error: {e}")))??;

    Ok(Json(outbound))
}
