//! Vent read API handlers: the browse surface for moderated content.

use crate::{api::ApiError, AppState};
use axum::{
    extract::{Extension, Path},
    Json,
};
use std::sync::Arc;
use vent_records::{get_vent, list_comments, Comment, Vent};

/// Handler for `GET /api/vents/{ventId}`.
pub async fn get_vent_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(vent_id): Path<String>,
) -> Result<Json<Vent>, ApiError> {
    let vent = tokio::task::spawn_blocking(move || {
        let conn = state
            .pool
            .get()
            .map_err(|e| ApiError::InternalServerError(format!("db connection failed: {e}")))?;
        get_vent(&conn, &vent_id).map_err(ApiError::from)
    })
    .await
    .map_err(|e| ApiError::InternalServerError(format!("task join error: {e}")))??;

    Ok(Json(vent))
}

/// Handler for `GET /api/vents/{ventId}/comments`.
pub async fn list_comments_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(vent_id): Path<String>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    let comments = tokio::task::spawn_blocking(move || {
        let conn = state
            .pool
            .get()
            .map_err(|e| ApiError::InternalServerError(format!("db connection failed: {e}")))?;
        list_comments(&conn, &vent_id).map_err(ApiError::from)
    })
    .await
    .map_err(|e| ApiError::InternalServerError(format!("task join error: {e}")))??;

    Ok(Json(comments))
}
