//! The pure authoring state machine.
//!
//! [`advance`] maps `(mode, event)` to `(new_mode, effect)` with no side
//! effects and no hidden inputs beyond the caller's user id (part of the
//! per-user conversation state). Drafts accumulate inside the mode
//! variants, so discarding a draft is simply dropping the mode.

use serde::{Deserialize, Serialize};
use vent_types::{resolve, DisclosureChoice, IdentityDisclosure, UserId};

use crate::event::{Action, EventKind};

/// Where a user currently is in the authoring flow.
///
/// The machine is cyclic: both commit and cancel return to `Idle`, and a
/// new session can start immediately.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionMode {
    /// No authoring session in progress.
    #[default]
    Idle,
    /// Waiting for the vent text.
    AwaitingVentText,
    /// Waiting for the disclosure choice on a vent.
    AwaitingVentIdentity { text: String },
    /// Waiting for the comment policy (and optional tags) on a vent.
    AwaitingVentCommentPolicy {
        text: String,
        identity: IdentityDisclosure,
        tags: Vec<String>,
    },
    /// Waiting for the comment text.
    AwaitingCommentText { vent_id: String },
    /// Waiting for the disclosure choice on a comment.
    AwaitingCommentIdentity { vent_id: String, text: String },
}

impl SessionMode {
    /// True when no authoring session is in progress.
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// A fully assembled vent, ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VentDraft {
    pub author_id: UserId,
    pub text: String,
    pub identity: IdentityDisclosure,
    pub allow_comments: bool,
    pub tags: Vec<String>,
}

/// A fully assembled comment, ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentDraft {
    pub author_id: UserId,
    pub vent_id: String,
    pub text: String,
    pub identity: IdentityDisclosure,
}

/// The record a completed session produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Draft {
    Vent(VentDraft),
    Comment(CommentDraft),
}

/// Why an event was refused without a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The submitted text was empty or whitespace.
    EmptyText,
    /// The event is not meaningful in the current mode.
    UnexpectedEvent,
}

/// What the machine wants done after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Ask the user for the next step.
    Prompt { text: String, actions: Vec<Action> },
    /// Persist the assembled draft; `fast_path` marks the implicit
    /// single-message commit.
    Committed { draft: Draft, fast_path: bool },
    /// The session was abandoned; nothing was or will be written.
    Cancelled,
    /// The event was refused; the mode is unchanged.
    Rejected(RejectReason),
}

/// Splits a free-text message into tags.
///
/// Comma-separated, trimmed, empties dropped.
pub fn parse_tags(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn prompt(text: &str, actions: Vec<Action>) -> Effect {
    Effect::Prompt {
        text: text.to_string(),
        actions,
    }
}

/// Advances one user's session by one event.
///
/// Pure: the same `(mode, event)` always produces the same result. The
/// dispatcher is responsible for pre-validating `StartComment` targets
/// against the store and for persisting `Committed` drafts.
///
/// Universal rules: `Cancel` succeeds from any mode and discards the
/// draft; any event unrecognised for the current mode leaves the mode
/// untouched and yields `Rejected(UnexpectedEvent)`.
pub fn advance(user_id: UserId, mode: &SessionMode, event: &EventKind) -> (SessionMode, Effect) {
    // Cancel first: valid everywhere, always wins.
    if matches!(
        event,
        EventKind::Button {
            action: Action::Cancel
        }
    ) {
        return (SessionMode::Idle, Effect::Cancelled);
    }

    match (mode, event) {
        // ── Vent path ────────────────────────────────────────────────
        (
            SessionMode::Idle,
            EventKind::Button {
                action: Action::StartVent,
            },
        ) => (
            SessionMode::AwaitingVentText,
            prompt(
                "Please send your vent text (text + emojis allowed):",
                vec![Action::Cancel],
            ),
        ),

        (SessionMode::AwaitingVentText, EventKind::Text { text }) => {
            if text.trim().is_empty() {
                return (
                    SessionMode::AwaitingVentText,
                    Effect::Rejected(RejectReason::EmptyText),
                );
            }
            (
                SessionMode::AwaitingVentIdentity {
                    text: text.clone(),
                },
                prompt(
                    "Show your identity on this vent?",
                    vec![Action::ShowIdentity, Action::HideIdentity, Action::Cancel],
                ),
            )
        }

        (
            SessionMode::AwaitingVentIdentity { text },
            EventKind::Button {
                action: action @ (Action::ShowIdentity | Action::HideIdentity),
            },
        ) => {
            let choice = if matches!(action, Action::ShowIdentity) {
                DisclosureChoice::Show
            } else {
                DisclosureChoice::Hide
            };
            (
                SessionMode::AwaitingVentCommentPolicy {
                    text: text.clone(),
                    identity: resolve(choice, user_id),
                    tags: Vec::new(),
                },
                prompt(
                    "Allow comments on this vent? Send tags first if you like (comma-separated).",
                    vec![
                        Action::AllowComments,
                        Action::DisallowComments,
                        Action::Cancel,
                    ],
                ),
            )
        }

        // Optional tags while the comment-policy prompt is open.
        (
            SessionMode::AwaitingVentCommentPolicy {
                text, identity, ..
            },
            EventKind::Text { text: tag_text },
        ) => (
            SessionMode::AwaitingVentCommentPolicy {
                text: text.clone(),
                identity: identity.clone(),
                tags: parse_tags(tag_text),
            },
            prompt(
                "Tags noted. Allow comments on this vent?",
                vec![
                    Action::AllowComments,
                    Action::DisallowComments,
                    Action::Cancel,
                ],
            ),
        ),

        (
            SessionMode::AwaitingVentCommentPolicy {
                text,
                identity,
                tags,
            },
            EventKind::Button {
                action: action @ (Action::AllowComments | Action::DisallowComments),
            },
        ) => (
            SessionMode::Idle,
            Effect::Committed {
                draft: Draft::Vent(VentDraft {
                    author_id: user_id,
                    text: text.clone(),
                    identity: identity.clone(),
                    allow_comments: matches!(action, Action::AllowComments),
                    tags: tags.clone(),
                }),
                fast_path: false,
            },
        ),

        // Implicit fast path: stray text while idle becomes a pending
        // vent with defaults, bypassing every prompt.
        (SessionMode::Idle, EventKind::Text { text }) => {
            if text.trim().is_empty() {
                return (SessionMode::Idle, Effect::Rejected(RejectReason::EmptyText));
            }
            (
                SessionMode::Idle,
                Effect::Committed {
                    draft: Draft::Vent(VentDraft {
                        author_id: user_id,
                        text: text.clone(),
                        identity: IdentityDisclosure::Hidden,
                        allow_comments: true,
                        tags: Vec::new(),
                    }),
                    fast_path: true,
                },
            )
        }

        // ── Comment path ─────────────────────────────────────────────
        (
            SessionMode::Idle,
            EventKind::Button {
                action: Action::StartComment { vent_id },
            },
        ) => (
            SessionMode::AwaitingCommentText {
                vent_id: vent_id.clone(),
            },
            prompt("Send your comment text:", vec![Action::Cancel]),
        ),

        (SessionMode::AwaitingCommentText { vent_id }, EventKind::Text { text }) => {
            if text.trim().is_empty() {
                return (
                    SessionMode::AwaitingCommentText {
                        vent_id: vent_id.clone(),
                    },
                    Effect::Rejected(RejectReason::EmptyText),
                );
            }
            (
                SessionMode::AwaitingCommentIdentity {
                    vent_id: vent_id.clone(),
                    text: text.clone(),
                },
                prompt(
                    "Show your identity on this comment?",
                    vec![
                        Action::ShowIdentity,
                        Action::HideIdentity,
                        Action::Finish,
                        Action::Cancel,
                    ],
                ),
            )
        }

        (
            SessionMode::AwaitingCommentIdentity { vent_id, text },
            EventKind::Button {
                action: action @ (Action::ShowIdentity | Action::HideIdentity | Action::Finish),
            },
        ) => {
            // Finish commits with the default disclosure.
            let identity = match action {
                Action::ShowIdentity => resolve(DisclosureChoice::Show, user_id),
                _ => IdentityDisclosure::Hidden,
            };
            (
                SessionMode::Idle,
                Effect::Committed {
                    draft: Draft::Comment(CommentDraft {
                        author_id: user_id,
                        vent_id: vent_id.clone(),
                        text: text.clone(),
                        identity,
                    }),
                    fast_path: false,
                },
            )
        }

        // Everything else: no transition, informational no-op.
        _ => (mode.clone(), Effect::Rejected(RejectReason::UnexpectedEvent)),
    }
}
