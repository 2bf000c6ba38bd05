//! Inbound event types delivered by the chat transport.

use serde::{Deserialize, Serialize};
use vent_types::UserId;

/// A button action carried by a button-press event.
///
/// The transport renders these as inline keyboard buttons; the tag
/// strings are the wire vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "camelCase")]
pub enum Action {
    /// Open the welcome menu.
    Start,
    /// Begin the guided vent flow.
    StartVent,
    /// Begin commenting on a vent.
    #[serde(rename_all = "camelCase")]
    StartComment { vent_id: String },
    /// Disclose identity on the submission being authored.
    ShowIdentity,
    /// Stay anonymous on the submission being authored.
    HideIdentity,
    /// Allow comments on the vent being authored.
    AllowComments,
    /// Disallow comments on the vent being authored.
    DisallowComments,
    /// Commit a comment with the default (hidden) disclosure.
    Finish,
    /// Abandon the current authoring session.
    Cancel,
    /// Show the caller's profile rollup.
    ShowProfile,
    /// Show usage instructions.
    Help,
    /// Show platform information.
    About,
    /// Invite free-form feedback.
    Feedback,
}

/// The payload of an inbound event: free text or a button press.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EventKind {
    /// The user sent a free-text message.
    Text { text: String },
    /// The user pressed an inline button.
    Button { action: Action },
}

/// An inbound event attributed to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundEvent {
    /// The user the event belongs to.
    pub user_id: UserId,
    /// What the user did.
    pub event: EventKind,
}
