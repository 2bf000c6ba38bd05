//! Event dispatcher: drives the pure machine and owns its side effects.
//!
//! Stateless menu actions (welcome, help, about, feedback, profile) are
//! answered directly. Everything else runs under the user's session
//! lock: the dispatcher pre-validates comment targets, advances the
//! machine, persists committed drafts, and writes the new mode back only
//! after persistence succeeded — a store failure leaves the conversation
//! exactly where it was so the user can retry the step.

use rusqlite::Connection;
use thiserror::Error;
use uuid::Uuid;

use vent_audit::{record_event, AuditPayload};
use vent_profile::{profile_summary, ProfileError, ProfileSummary};
use vent_records::{check_comment_target, create_comment, create_vent, NewComment, NewVent, RecordError};

use crate::event::{Action, EventKind, InboundEvent};
use crate::machine::{advance, Draft, Effect, RejectReason, SessionMode};
use crate::store::SessionStore;

const WELCOME_TEXT: &str = "Welcome to the vent platform! Choose an option:";
const HELP_TEXT: &str = "Step-by-step guide:\n\
    1. Press 'Start Vent' to send a vent.\n\
    2. Choose whether to show your identity.\n\
    3. Select if comments are allowed.\n\
    4. Add tags and send your vent.\n\
    5. Browse and add comments anonymously.\n\
    Moderators handle approvals.";
const ABOUT_TEXT: &str =
    "This platform lets you vent safely and anonymously. Moderation keeps it safe.";
const FEEDBACK_TEXT: &str = "Send your feedback now:";

/// Effects the transport renders back to the user.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Outbound {
    /// Ask the user something, offering these buttons.
    Prompt { text: String, actions: Vec<Action> },
    /// Tell the user something; no reply expected.
    Notice { text: String },
    /// The user's profile rollup.
    Profile(ProfileSummary),
}

impl Outbound {
    fn notice(text: &str) -> Self {
        Self::Notice {
            text: text.to_string(),
        }
    }
}

/// Errors surfaced by event handling.
///
/// Conversation state is left unchanged by every error, so the same
/// event can be retried.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error(transparent)]
    Profile(#[from] ProfileError),
}

/// Handles one inbound event and produces the effect to render.
///
/// Events for the same user are serialised by the session store; events
/// for different users run independently.
pub fn handle_event(
    conn: &Connection,
    sessions: &SessionStore,
    inbound: &InboundEvent,
) -> Result<Outbound, SessionError> {
    // Menu actions never touch conversation state.
    if let EventKind::Button { action } = &inbound.event {
        match action {
            Action::Start => {
                return Ok(Outbound::Prompt {
                    text: WELCOME_TEXT.to_string(),
                    actions: vec![
                        Action::StartVent,
                        Action::ShowProfile,
                        Action::Feedback,
                        Action::Help,
                        Action::About,
                    ],
                })
            }
            Action::Help => return Ok(Outbound::notice(HELP_TEXT)),
            Action::About => return Ok(Outbound::notice(ABOUT_TEXT)),
            // Feedback is an invitation only; whatever text follows takes
            // the fast path like any other idle message.
            Action::Feedback => return Ok(Outbound::notice(FEEDBACK_TEXT)),
            Action::ShowProfile => {
                return Ok(Outbound::Profile(profile_summary(conn, inbound.user_id)?))
            }
            _ => {}
        }
    }

    sessions.with_session(inbound.user_id, |mode| {
        // A comment session may only open against a vent that can accept
        // comments right now; surfaced before any transition.
        if mode.is_idle() {
            if let EventKind::Button {
                action: Action::StartComment { vent_id },
            } = &inbound.event
            {
                check_comment_target(conn, vent_id)?;
            }
        }

        let (new_mode, effect) = advance(inbound.user_id, mode, &inbound.event);
        let outbound = apply_effect(conn, mode, effect)?;
        *mode = new_mode;
        Ok(outbound)
    })
}

/// Performs the side effects of a transition; the caller writes the new
/// mode back only if this succeeds.
fn apply_effect(
    conn: &Connection,
    previous: &SessionMode,
    effect: Effect,
) -> Result<Outbound, SessionError> {
    match effect {
        Effect::Prompt { text, actions } => Ok(Outbound::Prompt { text, actions }),

        Effect::Cancelled => Ok(Outbound::notice(match previous {
            SessionMode::Idle => "Nothing to cancel.",
            SessionMode::AwaitingCommentText { .. } | SessionMode::AwaitingCommentIdentity { .. } => {
                "Comment cancelled ✅"
            }
            _ => "Vent cancelled ✅",
        })),

        Effect::Rejected(RejectReason::EmptyText) => Ok(Outbound::notice(
            "Your message is empty — please send some text.",
        )),

        Effect::Rejected(RejectReason::UnexpectedEvent) => {
            Ok(Outbound::notice("That action isn't available right now."))
        }

        Effect::Committed { draft, fast_path } => match draft {
            Draft::Vent(draft) => {
                let vent = create_vent(
                    conn,
                    &NewVent {
                        vent_id: Uuid::new_v4().to_string(),
                        author_id: draft.author_id,
                        text: draft.text,
                        identity: draft.identity,
                        allow_comments: draft.allow_comments,
                        tags: draft.tags,
                    },
                )?;

                audit(
                    conn,
                    &AuditPayload::VentSubmitted {
                        vent_id: vent.vent_id.clone(),
                        fast_path,
                    },
                );
                tracing::info!(vent_id = %vent.vent_id, fast_path, "vent submitted");

                Ok(Outbound::notice("Your vent has been sent for moderation 🔥"))
            }
            Draft::Comment(draft) => {
                let comment = create_comment(
                    conn,
                    &NewComment {
                        comment_id: Uuid::new_v4().to_string(),
                        vent_id: draft.vent_id,
                        author_id: draft.author_id,
                        text: draft.text,
                        identity: draft.identity,
                    },
                )?;

                audit(
                    conn,
                    &AuditPayload::CommentAdded {
                        comment_id: comment.comment_id.clone(),
                        vent_id: comment.vent_id.clone(),
                    },
                );
                tracing::info!(comment_id = %comment.comment_id, "comment submitted");

                Ok(Outbound::notice("Comment added to vent ✅"))
            }
        },
    }
}

/// Records an audit event; failures are logged but never block the user.
fn audit(conn: &Connection, payload: &AuditPayload) {
    if let Err(e) = record_event(conn, payload) {
        tracing::warn!(event_type = payload.event_type(), "failed to record audit event: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;
    use vent_db::run_migrations;
    use vent_moderation::{review, ModeratorRoster};
    use vent_records::{get_vent, list_vents_by_author};
    use vent_types::{ApprovalState, IdentityDisclosure, ModerationDecision, UserId};

    fn setup_db() -> Connection {
        let conn = Connection::open_in_memory().expect("failed to open in-memory db");
        run_migrations(&conn).expect("failed to run migrations");
        conn
    }

    fn text_event(user_id: UserId, text: &str) -> InboundEvent {
        InboundEvent {
            user_id,
            event: EventKind::Text {
                text: text.to_string(),
            },
        }
    }

    fn button_event(user_id: UserId, action: Action) -> InboundEvent {
        InboundEvent {
            user_id,
            event: EventKind::Button { action },
        }
    }

    fn record_counts(conn: &Connection) -> (i64, i64) {
        let vents: i64 = conn
            .query_row("SELECT COUNT(*) FROM vents", [], |row| row.get(0))
            .unwrap();
        let comments: i64 = conn
            .query_row("SELECT COUNT(*) FROM comments", [], |row| row.get(0))
            .unwrap();
        (vents, comments)
    }

    /// Runs a user through the guided vent flow and returns the vent id.
    fn guided_vent(
        conn: &Connection,
        sessions: &SessionStore,
        user_id: UserId,
        text: &str,
        disclosure: Action,
        policy: Action,
    ) -> String {
        handle_event(conn, sessions, &button_event(user_id, Action::StartVent)).unwrap();
        handle_event(conn, sessions, &text_event(user_id, text)).unwrap();
        handle_event(conn, sessions, &button_event(user_id, disclosure)).unwrap();
        handle_event(conn, sessions, &button_event(user_id, policy)).unwrap();
        list_vents_by_author(conn, user_id)
            .unwrap()
            .last()
            .expect("vent should exist")
            .vent_id
            .clone()
    }

    #[test]
    fn guided_flow_creates_exactly_one_pending_vent() {
        let conn = setup_db();
        let sessions = SessionStore::new();

        handle_event(&conn, &sessions, &button_event(7, Action::StartVent)).unwrap();
        handle_event(&conn, &sessions, &text_event(7, "long week")).unwrap();
        handle_event(&conn, &sessions, &button_event(7, Action::ShowIdentity)).unwrap();
        let out =
            handle_event(&conn, &sessions, &button_event(7, Action::DisallowComments)).unwrap();

        assert_eq!(out, Outbound::notice("Your vent has been sent for moderation 🔥"));
        assert_eq!(record_counts(&conn), (1, 0), "one vent, no comments");

        let vent = &list_vents_by_author(&conn, 7).unwrap()[0];
        assert_eq!(vent.text, "long week");
        assert_eq!(vent.identity, IdentityDisclosure::Shown("7".to_string()));
        assert!(!vent.allow_comments);
        assert_eq!(vent.approval, ApprovalState::Pending);
        assert!(sessions.is_empty(), "session resets to idle and is evicted");
    }

    #[test]
    fn stray_idle_text_commits_immediately_with_defaults() {
        let conn = setup_db();
        let sessions = SessionStore::new();

        let out = handle_event(&conn, &sessions, &text_event(3, "I had a rough day 😞")).unwrap();
        assert_eq!(out, Outbound::notice("Your vent has been sent for moderation 🔥"));

        let vent = &list_vents_by_author(&conn, 3).unwrap()[0];
        assert_eq!(vent.identity, IdentityDisclosure::Hidden);
        assert!(vent.allow_comments);
        assert!(vent.tags.is_empty());
        assert_eq!(vent.approval, ApprovalState::Pending);
    }

    #[test]
    fn empty_text_mid_flow_creates_nothing_and_holds_state() {
        let conn = setup_db();
        let sessions = SessionStore::new();

        handle_event(&conn, &sessions, &button_event(7, Action::StartVent)).unwrap();
        let out = handle_event(&conn, &sessions, &text_event(7, "   ")).unwrap();

        assert!(matches!(out, Outbound::Notice { .. }));
        assert_eq!(record_counts(&conn), (0, 0));
        assert_eq!(sessions.mode_of(7), Some(SessionMode::AwaitingVentText));
    }

    #[test]
    fn cancel_from_any_step_leaves_no_records() {
        let conn = setup_db();
        let sessions = SessionStore::new();

        handle_event(&conn, &sessions, &button_event(7, Action::StartVent)).unwrap();
        handle_event(&conn, &sessions, &text_event(7, "almost there")).unwrap();
        handle_event(&conn, &sessions, &button_event(7, Action::HideIdentity)).unwrap();

        let before = record_counts(&conn);
        let out = handle_event(&conn, &sessions, &button_event(7, Action::Cancel)).unwrap();

        assert_eq!(out, Outbound::notice("Vent cancelled ✅"));
        assert_eq!(record_counts(&conn), before);
        assert_eq!(before, (0, 0));
        assert!(sessions.is_empty());
    }

    #[test]
    fn comment_flow_on_approved_vent() {
        let conn = setup_db();
        let sessions = SessionStore::new();
        let roster = ModeratorRoster::new([100]);

        let vent_id = guided_vent(
            &conn,
            &sessions,
            1,
            "comment on me",
            Action::HideIdentity,
            Action::AllowComments,
        );
        review(&conn, &roster, &vent_id, 100, ModerationDecision::Approve).unwrap();

        handle_event(
            &conn,
            &sessions,
            &button_event(2, Action::StartComment { vent_id: vent_id.clone() }),
        )
        .unwrap();
        handle_event(&conn, &sessions, &text_event(2, "hang in there")).unwrap();
        let out = handle_event(&conn, &sessions, &button_event(2, Action::ShowIdentity)).unwrap();

        assert_eq!(out, Outbound::notice("Comment added to vent ✅"));
        assert_eq!(record_counts(&conn), (1, 1));
    }

    #[test]
    fn comment_refused_when_comments_disabled() {
        let conn = setup_db();
        let sessions = SessionStore::new();
        let roster = ModeratorRoster::new([100]);

        let vent_id = guided_vent(
            &conn,
            &sessions,
            1,
            "no comments",
            Action::HideIdentity,
            Action::DisallowComments,
        );
        review(&conn, &roster, &vent_id, 100, ModerationDecision::Approve).unwrap();

        let err = handle_event(
            &conn,
            &sessions,
            &button_event(2, Action::StartComment { vent_id }),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            SessionError::Record(RecordError::CommentsDisabled(_))
        ));
        assert_eq!(record_counts(&conn).1, 0);
        assert_eq!(sessions.mode_of(2), None, "no session was opened");
    }

    #[test]
    fn comment_refused_on_unpublished_vent() {
        let conn = setup_db();
        let sessions = SessionStore::new();

        // Pending vent: submitted but never reviewed.
        let vent_id = guided_vent(
            &conn,
            &sessions,
            1,
            "still pending",
            Action::HideIdentity,
            Action::AllowComments,
        );

        let err = handle_event(
            &conn,
            &sessions,
            &button_event(2, Action::StartComment { vent_id }),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Record(RecordError::NotPublished(_))
        ));
    }

    #[test]
    fn unexpected_action_is_an_informational_noop() {
        let conn = setup_db();
        let sessions = SessionStore::new();

        handle_event(&conn, &sessions, &button_event(7, Action::StartVent)).unwrap();
        let out =
            handle_event(&conn, &sessions, &button_event(7, Action::AllowComments)).unwrap();

        assert_eq!(out, Outbound::notice("That action isn't available right now."));
        assert_eq!(sessions.mode_of(7), Some(SessionMode::AwaitingVentText));
        assert_eq!(record_counts(&conn), (0, 0));
    }

    #[test]
    fn profile_reflects_raw_authorship_counts() {
        let conn = setup_db();
        let sessions = SessionStore::new();
        let roster = ModeratorRoster::new([100]);

        // Three vents in three approval states for user 1.
        handle_event(&conn, &sessions, &text_event(1, "one")).unwrap();
        let approved = guided_vent(
            &conn,
            &sessions,
            1,
            "two",
            Action::HideIdentity,
            Action::AllowComments,
        );
        let rejected = guided_vent(
            &conn,
            &sessions,
            1,
            "three",
            Action::ShowIdentity,
            Action::AllowComments,
        );
        review(&conn, &roster, &approved, 100, ModerationDecision::Approve).unwrap();
        review(&conn, &roster, &rejected, 100, ModerationDecision::Reject).unwrap();

        // Two comments by user 1 on the approved vent.
        for text in ["first", "second"] {
            handle_event(
                &conn,
                &sessions,
                &button_event(1, Action::StartComment { vent_id: approved.clone() }),
            )
            .unwrap();
            handle_event(&conn, &sessions, &text_event(1, text)).unwrap();
            handle_event(&conn, &sessions, &button_event(1, Action::Finish)).unwrap();
        }

        let out = handle_event(&conn, &sessions, &button_event(1, Action::ShowProfile)).unwrap();
        match out {
            Outbound::Profile(profile) => {
                assert_eq!(profile.vent_count, 3);
                assert_eq!(profile.comment_count, 2);
                assert_eq!(profile.impact_points, 0);
            }
            other => panic!("expected profile, got {other:?}"),
        }
    }

    #[test]
    fn menu_actions_do_not_open_sessions() {
        let conn = setup_db();
        let sessions = SessionStore::new();

        for action in [Action::Start, Action::Help, Action::About, Action::Feedback] {
            let out = handle_event(&conn, &sessions, &button_event(9, action)).unwrap();
            assert!(matches!(
                out,
                Outbound::Prompt { .. } | Outbound::Notice { .. }
            ));
        }
        assert!(sessions.is_empty());
    }

    #[test]
    fn users_do_not_interfere() {
        let conn = setup_db();
        let sessions = SessionStore::new();

        // User 1 is mid-flow; user 2's fast path must not disturb them.
        handle_event(&conn, &sessions, &button_event(1, Action::StartVent)).unwrap();
        handle_event(&conn, &sessions, &text_event(2, "other user's vent")).unwrap();

        assert_eq!(sessions.mode_of(1), Some(SessionMode::AwaitingVentText));
        let vents = list_vents_by_author(&conn, 2).unwrap();
        assert_eq!(vents.len(), 1);
        assert!(list_vents_by_author(&conn, 1).unwrap().is_empty());

        // User 1 finishes normally.
        handle_event(&conn, &sessions, &text_event(1, "mine")).unwrap();
        handle_event(&conn, &sessions, &button_event(1, Action::HideIdentity)).unwrap();
        handle_event(&conn, &sessions, &button_event(1, Action::AllowComments)).unwrap();

        let vent = &list_vents_by_author(&conn, 1).unwrap()[0];
        assert_eq!(vent.text, "mine");
        assert_eq!(get_vent(&conn, &vent.vent_id).unwrap().approval, ApprovalState::Pending);
    }

    #[test]
    fn submissions_and_commits_reach_the_audit_log() {
        let conn = setup_db();
        let sessions = SessionStore::new();

        handle_event(&conn, &sessions, &text_event(1, "audited")).unwrap();

        let events = vent_audit::query_events(&conn, &Default::default()).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "VENT_SUBMITTED");
        let payload: vent_audit::AuditPayload =
            serde_json::from_str(&events[0].payload_json).unwrap();
        match payload {
            vent_audit::AuditPayload::VentSubmitted { fast_path, .. } => assert!(fast_path),
            other => panic!("unexpected payload: {other:?}"),
        }
    }
}
