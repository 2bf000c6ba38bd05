//! Append-only audit log for the vent platform.
//!
//! Every submission and every moderation decision is recorded as a typed
//! event in the `audit_log` table. The log is the answer to "who approved
//! this and when" — submissions never record the author, so the log can
//! be read by moderators without weakening anonymity.
//!
//! # Event domains
//!
//! | Domain | Event types |
//! |--------|-------------|
//! | `SUBMISSION` | `VENT_SUBMITTED`, `COMMENT_ADDED` |
//! | `MODERATION` | `VENT_APPROVED`, `VENT_REJECTED` |

mod error;
mod event;
mod store;

pub use error::AuditError;
pub use event::{AuditDomain, AuditPayload, ParseAuditDomainError};
pub use store::{query_events, record_event, AuditEvent, AuditFilter};
