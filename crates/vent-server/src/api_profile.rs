//! Profile API handler.

use crate::{api::ApiError, AppState};
use axum::{
    extract::{Extension, Path},
    Json,
};
use std::sync::Arc;
use vent_profile::{profile_summary, ProfileSummary};
use vent_types::UserId;

/// Handler for `GET /api/profile/{userId}`.
pub async fn get_profile_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(user_id): Path<UserId>,
) -> Result<Json<ProfileSummary>, ApiError> {
    let profile = tokio::task::spawn_blocking(move || {
        let conn = state
            .pool
            .get()
            .map_err(|e| ApiError::InternalServerError(format!("db connection failed: {e}")))?;
        profile_summary(&conn, user_id).map_err(ApiError::from)
    })
    .await
    .map_err(|e| ApiError::InternalServerError(format!("task join error: {e}")))??;

    Ok(Json(profile))
}
