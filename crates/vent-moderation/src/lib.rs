//! Moderation gate for the vent platform.
//!
//! Owns the approval transition on vents: `PENDING` moves exactly once to
//! `APPROVED` or `REJECTED`, decided by a member of the injected
//! moderator roster. The transition is a single atomic UPDATE guarded on
//! the current state, so a second review can never overwrite the first
//! decision.

use rusqlite::{params, Connection};
use std::collections::HashSet;
use thiserror::Error;
use vent_records::{RecordError, Vent};
use vent_types::{ApprovalState, ModerationDecision, UserId};

/// The set of user identifiers allowed to review vents.
///
/// Built from configuration at startup and injected wherever review
/// authority is checked — never read from ambient process state.
#[derive(Debug, Clone, Default)]
pub struct ModeratorRoster {
    admins: HashSet<UserId>,
}

impl ModeratorRoster {
    /// Builds a roster from a list of admin user identifiers.
    pub fn new<I: IntoIterator<Item = UserId>>(admins: I) -> Self {
        Self {
            admins: admins.into_iter().collect(),
        }
    }

    /// Membership check — the sole authorization rule for [`review`].
    pub fn is_moderator(&self, user_id: UserId) -> bool {
        self.admins.contains(&user_id)
    }

    /// Number of roster members.
    pub fn len(&self) -> usize {
        self.admins.len()
    }

    /// True when no moderators are configured.
    pub fn is_empty(&self) -> bool {
        self.admins.is_empty()
    }
}

/// Errors that can occur during moderation operations.
#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("user {0} is not authorized to review vents")]
    NotAuthorized(UserId),
    #[error("vent not found: {0}")]
    VentNotFound(String),
    #[error("vent {vent_id} was already reviewed ({approval})")]
    AlreadyReviewed {
        vent_id: String,
        approval: ApprovalState,
    },
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error(transparent)]
    Record(RecordError),
}

/// Applies a moderator decision to a pending vent.
///
/// The one-shot transition: `UPDATE ... WHERE approval = 'PENDING'`
/// either moves the vent into its terminal state or touches nothing.
/// When nothing was updated the error distinguishes an unknown vent from
/// one that has already been reviewed; in the latter case the stored
/// approval state is reported and preserved.
///
/// # Errors
///
/// `NotAuthorized` for callers outside the roster (checked before any
/// store access), `VentNotFound`, `AlreadyReviewed`, or a database error.
pub fn review(
    conn: &Connection,
    roster: &ModeratorRoster,
    vent_id: &str,
    moderator_id: UserId,
    decision: ModerationDecision,
) -> Result<Vent, ModerationError> {
    if !roster.is_moderator(moderator_id) {
        return Err(ModerationError::NotAuthorized(moderator_id));
    }

    let updated = conn.execute(
        "UPDATE vents SET approval = ?1 WHERE vent_id = ?2 AND approval = 'PENDING'",
        params![decision.approval().as_str(), vent_id],
    )?;

    if updated == 0 {
        return Err(match vent_records::get_vent(conn, vent_id) {
            Ok(vent) => ModerationError::AlreadyReviewed {
                vent_id: vent.vent_id,
                approval: vent.approval,
            },
            Err(RecordError::VentNotFound(id)) => ModerationError::VentNotFound(id),
            Err(e) => ModerationError::Record(e),
        });
    }

    tracing::info!(
        vent_id,
        moderator_id,
        decision = decision.approval().as_str(),
        "vent reviewed"
    );

    vent_records::get_vent(conn, vent_id).map_err(ModerationError::Record)
}

/// Lists vents awaiting review, oldest first.
pub fn pending_queue(conn: &Connection, limit: u32) -> Result<Vec<Vent>, ModerationError> {
    vent_records::list_pending_vents(conn, limit).map_err(ModerationError::Record)
}
