//! Submission state machine for the vent platform.
//!
//! Drives a single user's authoring session from the first button press
//! to a committed record or a cancellation. The machine itself
//! ([`advance`]) is a pure function of the current mode and the inbound
//! event; the dispatcher ([`handle_event`]) owns the side effects:
//! store writes, audit events, and the write-back of the new mode.
//!
//! Per-user serialization: the [`SessionStore`] arena hands out one lock
//! per user, and the dispatcher holds it for the whole
//! advance-persist-writeback sequence. Events for different users never
//! interfere; events for the same user are applied one at a time.

mod dispatch;
mod event;
mod machine;
mod store;

pub use dispatch::{handle_event, Outbound, SessionError};
pub use event::{Action, EventKind, InboundEvent};
pub use machine::{advance, parse_tags, CommentDraft, Draft, Effect, RejectReason, SessionMode, VentDraft};
pub use store::SessionStore;
