//! Domain, payload, and parsing types for the audit log.

use serde::{Deserialize, Serialize};
use vent_types::UserId;

/// Audit event domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditDomain {
    /// Vent and comment submissions.
    #[serde(rename = "SUBMISSION")]
    Submission,
    /// Moderator decisions on pending vents.
    #[serde(rename = "MODERATION")]
    Moderation,
}

impl AuditDomain {
    /// Returns the canonical string label for this domain.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Submission => "SUBMISSION",
            Self::Moderation => "MODERATION",
        }
    }
}

impl std::fmt::Display for AuditDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AuditDomain {
    type Err = ParseAuditDomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SUBMISSION" => Ok(Self::Submission),
            "MODERATION" => Ok(Self::Moderation),
            _ => Err(ParseAuditDomainError(s.to_string())),
        }
    }
}

/// Error returned when parsing an unknown audit domain string.
#[derive(Debug, Clone)]
pub struct ParseAuditDomainError(pub String);

impl std::fmt::Display for ParseAuditDomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown audit domain: {}", self.0)
    }
}

impl std::error::Error for ParseAuditDomainError {}

/// Structured payloads for each audit event type.
///
/// Payloads are serialised to JSON and stored in the `payload_json`
/// column. Submission payloads never include the author identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditPayload {
    /// A vent was committed to the store (pending approval).
    VentSubmitted {
        /// Public ID of the new vent.
        vent_id: String,
        /// True when the vent took the implicit single-message path.
        fast_path: bool,
    },

    /// A comment was attached to an approved vent.
    CommentAdded {
        /// Public ID of the new comment.
        comment_id: String,
        /// Public ID of the parent vent.
        vent_id: String,
    },

    /// A moderator approved a pending vent.
    VentApproved {
        /// Public ID of the reviewed vent.
        vent_id: String,
        /// Identifier of the deciding moderator.
        moderator_id: UserId,
    },

    /// A moderator rejected a pending vent.
    VentRejected {
        /// Public ID of the reviewed vent.
        vent_id: String,
        /// Identifier of the deciding moderator.
        moderator_id: UserId,
    },
}

impl AuditPayload {
    /// The domain this payload belongs to.
    pub fn domain(&self) -> AuditDomain {
        match self {
            Self::VentSubmitted { .. } | Self::CommentAdded { .. } => AuditDomain::Submission,
            Self::VentApproved { .. } | Self::VentRejected { .. } => AuditDomain::Moderation,
        }
    }

    /// The `event_type` string stored alongside the payload.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::VentSubmitted { .. } => "VENT_SUBMITTED",
            Self::CommentAdded { .. } => "COMMENT_ADDED",
            Self::VentApproved { .. } => "VENT_APPROVED",
            Self::VentRejected { .. } => "VENT_REJECTED",
        }
    }

    /// The `entity_type` string stored alongside the payload.
    pub fn entity_type(&self) -> &'static str {
        match self {
            Self::CommentAdded { .. } => "comment",
            _ => "vent",
        }
    }

    /// The entity the event is about, as stored in `entity_id`.
    pub fn entity_id(&self) -> &str {
        match self {
            Self::VentSubmitted { vent_id, .. }
            | Self::VentApproved { vent_id, .. }
            | Self::VentRejected { vent_id, .. } => vent_id,
            Self::CommentAdded { comment_id, .. } => comment_id,
        }
    }
}
