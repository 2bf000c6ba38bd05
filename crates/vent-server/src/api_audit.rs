//! Audit log API handler.

use crate::{api::ApiError, AppState};
use axum::{
    extract::{Extension, Query},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use vent_audit::{query_events, AuditDomain, AuditEvent, AuditFilter};

/// Query parameters for `GET /api/audit/events`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEventsQuery {
    /// Filter by domain label (`SUBMISSION` or `MODERATION`).
    pub domain: Option<String>,
    /// Filter by event type string.
    pub event_type: Option<String>,
    /// Filter by entity ID.
    pub entity_id: Option<String>,
    /// Only events at or after this ISO 8601 timestamp.
    pub since: Option<String>,
    /// Maximum number of events (default 100, cap 500).
    pub limit: Option<i64>,
}

/// Handler for `GET /api/audit/events`.
pub async fn get_events_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<AuditEventsQuery>,
) -> Result<Json<Vec<AuditEvent>>, ApiError> {
    let domain = params
        .domain
        .as_deref()
        .map(|raw| raw.parse::<AuditDomain>())
        .transpose()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let filter = AuditFilter {
        domain,
        event_type: params.event_type,
        entity_id: params.entity_id,
        since: params.since,
        limit: Some(params.limit.unwrap_or(100).min(500)),
    };

    let events = tokio::task::spawn_blocking(move || {
        let conn = state
            .pool
            .get()
            .map_err(|e| ApiError::InternalServerError(format!("db connection failed: {e}")))?;
        query_events(&conn, &filter)
            .map_err(|e| ApiError::InternalServerError(e.to_string()))
    })
    .await
    .map_err(|e| ApiError::InternalServerError(format!("task join error: {e}")))??;

    Ok(Json(events))
}
