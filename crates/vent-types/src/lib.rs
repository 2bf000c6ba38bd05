//! Shared types and constants for the vent platform.
//!
//! This crate provides the foundational types used across all workspace
//! crates: identity disclosure values, the pure identity policy, approval
//! states, and moderation decisions. No other crate in the workspace is a
//! dependency of `vent-types`, which keeps the dependency graph acyclic.

use serde::{Deserialize, Serialize};

/// A user identifier as assigned by the chat transport.
pub type UserId = i64;

/// The stored identity value on a vent or comment.
///
/// Serialised to JSON for the `identity` column: `"Hidden"` or
/// `{"Shown":"<token>"}`. The token is whatever [`resolve`] produced at
/// submission time and is immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentityDisclosure {
    /// The author's identity is not revealed.
    Hidden,
    /// The author chose to disclose; carries the identity token to show.
    Shown(String),
}

impl IdentityDisclosure {
    /// Returns true when the author's identity is not revealed.
    pub fn is_hidden(&self) -> bool {
        matches!(self, Self::Hidden)
    }

    /// Returns the disclosed token, if any.
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Hidden => None,
            Self::Shown(token) => Some(token),
        }
    }
}

/// A user's disclosure choice for a single submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisclosureChoice {
    /// Disclose the author's identity on this submission.
    Show,
    /// Keep the author anonymous on this submission.
    Hide,
}

impl std::str::FromStr for DisclosureChoice {
    type Err = ParseDisclosureChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "show" => Ok(Self::Show),
            "hide" => Ok(Self::Hide),
            _ => Err(ParseDisclosureChoiceError(s.to_string())),
        }
    }
}

/// Error returned when parsing an unknown disclosure choice string.
#[derive(Debug, Clone)]
pub struct ParseDisclosureChoiceError(pub String);

impl std::fmt::Display for ParseDisclosureChoiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid disclosure choice: {}", self.0)
    }
}

impl std::error::Error for ParseDisclosureChoiceError {}

/// Resolves a disclosure choice into the stored identity value.
///
/// Pure identity policy: `Hide` maps to [`IdentityDisclosure::Hidden`];
/// `Show` maps to [`IdentityDisclosure::Shown`] carrying the user's own
/// identifier as the token. Display handles are a transport concern and
/// never reach this layer.
pub fn resolve(choice: DisclosureChoice, user_id: UserId) -> IdentityDisclosure {
    match choice {
        DisclosureChoice::Hide => IdentityDisclosure::Hidden,
        DisclosureChoice::Show => IdentityDisclosure::Shown(user_id.to_string()),
    }
}

/// Moderation lifecycle state of a vent.
///
/// Every vent starts `Pending` and is moved exactly once to `Approved`
/// or `Rejected` by the moderation gate. Stored as its canonical string
/// label in the `approval` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApprovalState {
    /// Awaiting a moderator decision.
    #[serde(rename = "PENDING")]
    Pending,
    /// Published; eligible for comments (subject to the comment flag).
    #[serde(rename = "APPROVED")]
    Approved,
    /// Refused; no further mutation is permitted.
    #[serde(rename = "REJECTED")]
    Rejected,
}

impl ApprovalState {
    /// Returns the canonical string label for this state.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }
}

impl std::fmt::Display for ApprovalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ApprovalState {
    type Err = ParseApprovalStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "APPROVED" => Ok(Self::Approved),
            "REJECTED" => Ok(Self::Rejected),
            _ => Err(ParseApprovalStateError(s.to_string())),
        }
    }
}

/// Error returned when parsing an unknown approval state string.
#[derive(Debug, Clone)]
pub struct ParseApprovalStateError(pub String);

impl std::fmt::Display for ParseApprovalStateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown approval state: {}", self.0)
    }
}

impl std::error::Error for ParseApprovalStateError {}

/// A moderator's decision on a pending vent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationDecision {
    /// Publish the vent.
    Approve,
    /// Refuse the vent.
    Reject,
}

impl ModerationDecision {
    /// The approval state this decision transitions a pending vent into.
    pub fn approval(self) -> ApprovalState {
        match self {
            Self::Approve => ApprovalState::Approved,
            Self::Reject => ApprovalState::Rejected,
        }
    }
}
