//! Read-only profile rollup for the vent platform.
//!
//! Computes per-user authorship counts from the record store. Counts are
//! raw authorship: vents are counted in every approval state, because the
//! profile reports what a user has written, not what moderation has
//! published. The derived reputation fields carry fixed defaults until a
//! scoring component exists.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vent_types::UserId;

/// Errors that can occur while computing a profile.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// A database operation failed.
    #[error("profile database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// A user's profile rollup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    /// The user the rollup is for.
    pub user_id: UserId,
    /// Number of vents authored, regardless of approval state.
    pub vent_count: i64,
    /// Number of comments authored.
    pub comment_count: i64,
    /// Reputation placeholder; always 0 until scoring exists.
    pub impact_points: i64,
    /// Reputation placeholder; always 0.0 until scoring exists.
    pub community_acceptance: f64,
}

/// Computes the profile rollup for a user.
///
/// Read-only; the only failure mode is a store error, passed through.
pub fn profile_summary(conn: &Connection, user_id: UserId) -> Result<ProfileSummary, ProfileError> {
    let vent_count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM vents WHERE author_id = ?1",
        [user_id],
        |row| row.get(0),
    )?;

    let comment_count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM comments WHERE author_id = ?1",
        [user_id],
        |row| row.get(0),
    )?;

    Ok(ProfileSummary {
        user_id,
        vent_count,
        comment_count,
        impact_points: 0,
        community_acceptance: 0.0,
    })
}
