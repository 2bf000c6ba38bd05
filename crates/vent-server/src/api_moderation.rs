//! Moderation API handlers.

use crate::{api::ApiError, AppState};
use axum::{
    extract::{Extension, Query},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use vent_audit::{record_event, AuditPayload};
use vent_moderation::{pending_queue, review};
use vent_records::Vent;
use vent_types::{ModerationDecision, UserId};

/// Request body for `POST /api/moderation/review`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    /// Public ID of the vent under review.
    pub vent_id: String,
    /// Identifier of the moderator making the decision.
    pub moderator_id: UserId,
    /// The decision: `approve` or `reject`.
    pub decision: ModerationDecision,
}

/// Query parameters for `GET /api/moderation/queue`.
#[derive(Debug, Deserialize)]
pub struct QueueParams {
    /// Maximum number of pending vents to return (default 50, cap 200).
    pub limit: Option<u32>,
}

/// Handler for `POST /api/moderation/review`.
///
/// Applies a one-shot approval decision. Authorization is roster
/// membership, checked by the gate itself.
pub async fn review_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<ReviewRequest>,
) -> Result<Json<Vent>, ApiError> {
    let vent = tokio::task::spawn_blocking(move || {
        let conn = state
            .pool
            .get()
            .map_err(|e| ApiError::InternalServerError(format!("db connection failed: {e}")))?;

        let vent = review(
            &conn,
            &state.roster,
            &payload.vent_id,
            payload.moderator_id,
            payload.decision,
        )
        .map_err(ApiError::from)?;

        let audit_payload = match payload.decision {
            ModerationDecision::Approve => AuditPayload::VentApproved {
                vent_id: vent.vent_id.clone(),
                moderator_id: payload.moderator_id,
            },
            ModerationDecision::Reject => AuditPayload::VentRejected {
                vent_id: vent.vent_id.clone(),
                moderator_id: payload.moderator_id,
            },
        };
        if let Err(e) = record_event(&conn, &audit_payload) {
            tracing::warn!("failed to record moderation audit event: {e}");
        }

        Ok::<Vent, ApiError>(vent)
    })
    .await
    .map_err(|e| ApiError::InternalServerError(format!("task join error: {e}")))??;

    Ok(Json(vent))
}

/// Handler for `GET /api/moderation/queue`.
pub async fn queue_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<QueueParams>,
) -> Result<Json<Vec<Vent>>, ApiError> {
    let limit = params.limit.unwrap_or(50).min(200);

    let queue = tokio::task::spawn_blocking(move || {
        let conn = state
            .pool
            .get()
            .map_err(|e| ApiError::InternalServerError(format!("db connection failed: {e}")))?;
        pending_queue(&conn, limit).map_err(ApiError::from)
    })
    .await
    .map_err(|e| ApiError::InternalServerError(format!("task join error: {e}")))??;

    Ok(Json(queue))
}
