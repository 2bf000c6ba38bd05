//! Vent and comment persistence for the vent platform.
//!
//! Implements record creation and retrieval over the pooled SQLite store.
//! A vent is created with `approval = PENDING` and never mutated by this
//! crate; the approval transition belongs to `vent-moderation`. Comments
//! attach to a parent vent only when the parent is approved and allows
//! them — the policy is enforced here, at creation time, and never
//! retroactively (both parent flags are immutable).

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vent_types::{ApprovalState, IdentityDisclosure, UserId};

/// Errors that can occur during record operations.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("json serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("vent not found: {0}")]
    VentNotFound(String),
    #[error("submission text is empty")]
    EmptyText,
    #[error("vent {0} does not allow comments")]
    CommentsDisabled(String),
    #[error("vent {0} is not published")]
    NotPublished(String),
}

/// A user-submitted vent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vent {
    /// Internal database ID.
    pub id: i64,
    /// Unique public ID (UUID).
    pub vent_id: String,
    /// Identifier of the submitting user.
    pub author_id: UserId,
    /// Submission text.
    pub text: String,
    /// Disclosure chosen at submission; immutable afterwards.
    pub identity: IdentityDisclosure,
    /// Whether comments may be attached once the vent is approved.
    pub allow_comments: bool,
    /// Short labels attached at submission (may be empty).
    pub tags: Vec<String>,
    /// Moderation lifecycle state.
    pub approval: ApprovalState,
    /// Creation timestamp (ISO 8601).
    pub created_at: String,
}

/// Parameters for creating a new vent.
///
/// No approval field: every vent starts `PENDING`.
#[derive(Debug, Clone)]
pub struct NewVent {
    pub vent_id: String,
    pub author_id: UserId,
    pub text: String,
    pub identity: IdentityDisclosure,
    pub allow_comments: bool,
    pub tags: Vec<String>,
}

/// A comment attached to a vent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    /// Internal database ID.
    pub id: i64,
    /// Unique public ID (UUID).
    pub comment_id: String,
    /// Public ID of the parent vent.
    pub vent_id: String,
    /// Identifier of the commenting user.
    pub author_id: UserId,
    /// Comment text.
    pub text: String,
    /// Disclosure chosen independently of the parent vent.
    pub identity: IdentityDisclosure,
    /// Creation timestamp (ISO 8601).
    pub created_at: String,
}

/// Parameters for creating a new comment.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub comment_id: String,
    pub vent_id: String,
    pub author_id: UserId,
    pub text: String,
    pub identity: IdentityDisclosure,
}

/// Creates a new vent with `approval = PENDING`.
///
/// # Errors
///
/// Returns `RecordError::EmptyText` if the text is empty or whitespace;
/// the row is inserted atomically in a single statement.
pub fn create_vent(conn: &Connection, new: &NewVent) -> Result<Vent, RecordError> {
    if new.text.trim().is_empty() {
        return Err(RecordError::EmptyText);
    }

    let identity_json = serde_json::to_string(&new.identity)?;
    let tags_json = serde_json::to_string(&new.tags)?;

    let vent = conn.query_row(
        "INSERT INTO vents (vent_id, author_id, text, identity, allow_comments, tags_json, approval)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'PENDING')
         RETURNING id, vent_id, author_id, text, identity, allow_comments, tags_json, approval, created_at",
        params![
            new.vent_id,
            new.author_id,
            new.text,
            identity_json,
            new.allow_comments,
            tags_json,
        ],
        map_row_to_vent,
    )?;

    tracing::debug!(vent_id = %vent.vent_id, author_id = vent.author_id, "vent created");
    Ok(vent)
}

/// Retrieves a vent by its public ID.
pub fn get_vent(conn: &Connection, vent_id: &str) -> Result<Vent, RecordError> {
    conn.query_row(
        "SELECT id, vent_id, author_id, text, identity, allow_comments, tags_json, approval, created_at
         FROM vents WHERE vent_id = ?1",
        [vent_id],
        map_row_to_vent,
    )
    .optional()?
    .ok_or_else(|| RecordError::VentNotFound(vent_id.to_string()))
}

/// Lists all vents submitted by a user, oldest first.
pub fn list_vents_by_author(conn: &Connection, author_id: UserId) -> Result<Vec<Vent>, RecordError> {
    let mut stmt = conn.prepare(
        "SELECT id, vent_id, author_id, text, identity, allow_comments, tags_json, approval, created_at
         FROM vents WHERE author_id = ?1 ORDER BY id ASC",
    )?;

    let rows = stmt.query_map([author_id], map_row_to_vent)?;
    let mut vents = Vec::new();
    for row in rows {
        vents.push(row?);
    }
    Ok(vents)
}

/// Lists vents awaiting a moderation decision, oldest first.
pub fn list_pending_vents(conn: &Connection, limit: u32) -> Result<Vec<Vent>, RecordError> {
    let mut stmt = conn.prepare(
        "SELECT id, vent_id, author_id, text, identity, allow_comments, tags_json, approval, created_at
         FROM vents WHERE approval = 'PENDING' ORDER BY id ASC LIMIT ?1",
    )?;

    let rows = stmt.query_map([limit], map_row_to_vent)?;
    let mut vents = Vec::new();
    for row in rows {
        vents.push(row?);
    }
    Ok(vents)
}

/// Checks that a vent may accept comments right now.
///
/// A comment target must exist, be approved, and have comments enabled.
/// Used both before opening a comment authoring session and again at
/// comment creation.
pub fn check_comment_target(conn: &Connection, vent_id: &str) -> Result<Vent, RecordError> {
    let vent = get_vent(conn, vent_id)?;
    if !vent.allow_comments {
        return Err(RecordError::CommentsDisabled(vent_id.to_string()));
    }
    if vent.approval != ApprovalState::Approved {
        return Err(RecordError::NotPublished(vent_id.to_string()));
    }
    Ok(vent)
}

/// Creates a new comment on a vent.
///
/// Comments publish immediately — there is no approval gate for them.
///
/// # Errors
///
/// Returns `VentNotFound` / `NotPublished` / `CommentsDisabled` when the
/// target cannot accept comments, or `EmptyText` for blank content.
pub fn create_comment(conn: &Connection, new: &NewComment) -> Result<Comment, RecordError> {
    if new.text.trim().is_empty() {
        return Err(RecordError::EmptyText);
    }

    check_comment_target(conn, &new.vent_id)?;

    let identity_json = serde_json::to_string(&new.identity)?;

    let comment = conn.query_row(
        "INSERT INTO comments (comment_id, vent_id, author_id, text, identity)
         VALUES (?1, ?2, ?3, ?4, ?5)
         RETURNING id, comment_id, vent_id, author_id, text, identity, created_at",
        params![
            new.comment_id,
            new.vent_id,
            new.author_id,
            new.text,
            identity_json,
        ],
        map_row_to_comment,
    )?;

    tracing::debug!(
        comment_id = %comment.comment_id,
        vent_id = %comment.vent_id,
        "comment created"
    );
    Ok(comment)
}

/// Lists the comments on a vent, oldest first.
pub fn list_comments(conn: &Connection, vent_id: &str) -> Result<Vec<Comment>, RecordError> {
    // Surface NotFound for unknown vents rather than an empty list.
    let _ = get_vent(conn, vent_id)?;

    let mut stmt = conn.prepare(
        "SELECT id, comment_id, vent_id, author_id, text, identity, created_at
         FROM comments WHERE vent_id = ?1 ORDER BY id ASC",
    )?;

    let rows = stmt.query_map([vent_id], map_row_to_comment)?;
    let mut comments = Vec::new();
    for row in rows {
        comments.push(row?);
    }
    Ok(comments)
}

fn map_row_to_vent(row: &Row) -> rusqlite::Result<Vent> {
    let identity_str: String = row.get(4)?;
    let identity: IdentityDisclosure = serde_json::from_str(&identity_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let tags_str: String = row.get(6)?;
    let tags: Vec<String> = serde_json::from_str(&tags_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let approval_str: String = row.get(7)?;
    let approval: ApprovalState = approval_str.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(7, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Vent {
        id: row.get(0)?,
        vent_id: row.get(1)?,
        author_id: row.get(2)?,
        text: row.get(3)?,
        identity,
        allow_comments: row.get(5)?,
        tags,
        approval,
        created_at: row.get(8)?,
    })
}

fn map_row_to_comment(row: &Row) -> rusqlite::Result<Comment> {
    let identity_str: String = row.get(5)?;
    let identity: IdentityDisclosure = serde_json::from_str(&identity_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Comment {
        id: row.get(0)?,
        comment_id: row.get(1)?,
        vent_id: row.get(2)?,
        author_id: row.get(3)?,
        text: row.get(4)?,
        identity,
        created_at: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;
    use uuid::Uuid;
    use vent_db::run_migrations;

    fn setup_db() -> Connection {
        let conn = Connection::open_in_memory().expect("failed to open in-memory db");
        run_migrations(&conn).expect("failed to run migrations");
        conn
    }

    fn new_vent(author_id: UserId, text: &str) -> NewVent {
        NewVent {
            vent_id: Uuid::new_v4().to_string(),
            author_id,
            text: text.to_string(),
            identity: IdentityDisclosure::Hidden,
            allow_comments: true,
            tags: Vec::new(),
        }
    }

    fn approve(conn: &Connection, vent_id: &str) {
        conn.execute(
            "UPDATE vents SET approval = 'APPROVED' WHERE vent_id = ?1",
            [vent_id],
        )
        .expect("approve failed");
    }

    #[test]
    fn vent_create_and_get() {
        let conn = setup_db();

        let new = NewVent {
            vent_id: "vent-1".to_string(),
            author_id: 7,
            text: "I had a rough day 😞".to_string(),
            identity: IdentityDisclosure::Shown("7".to_string()),
            allow_comments: false,
            tags: vec!["work".to_string(), "stress".to_string()],
        };

        let created = create_vent(&conn, &new).expect("create failed");
        assert_eq!(created.approval, ApprovalState::Pending);
        assert_eq!(created.tags, vec!["work", "stress"]);

        let fetched = get_vent(&conn, "vent-1").expect("get failed");
        assert_eq!(fetched, created);
        assert_eq!(fetched.identity, IdentityDisclosure::Shown("7".to_string()));
        assert!(!fetched.allow_comments);
    }

    #[test]
    fn vent_empty_text_rejected() {
        let conn = setup_db();

        let err = create_vent(&conn, &new_vent(1, "   \n ")).unwrap_err();
        assert!(matches!(err, RecordError::EmptyText));

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM vents", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0, "no row should be written");
    }

    #[test]
    fn vent_not_found() {
        let conn = setup_db();
        let err = get_vent(&conn, "ghost").unwrap_err();
        match err {
            RecordError::VentNotFound(id) => assert_eq!(id, "ghost"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn list_by_author_is_scoped() {
        let conn = setup_db();
        create_vent(&conn, &new_vent(1, "first")).unwrap();
        create_vent(&conn, &new_vent(1, "second")).unwrap();
        create_vent(&conn, &new_vent(2, "other author")).unwrap();

        let vents = list_vents_by_author(&conn, 1).expect("list failed");
        assert_eq!(vents.len(), 2);
        assert_eq!(vents[0].text, "first");
        assert_eq!(vents[1].text, "second");
    }

    #[test]
    fn comment_on_approved_vent() {
        let conn = setup_db();
        let vent = create_vent(&conn, &new_vent(1, "vent")).unwrap();
        approve(&conn, &vent.vent_id);

        let comment = create_comment(
            &conn,
            &NewComment {
                comment_id: "c-1".to_string(),
                vent_id: vent.vent_id.clone(),
                author_id: 2,
                text: "hang in there".to_string(),
                identity: IdentityDisclosure::Hidden,
            },
        )
        .expect("comment failed");

        assert_eq!(comment.vent_id, vent.vent_id);

        let comments = list_comments(&conn, &vent.vent_id).expect("list failed");
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].text, "hang in there");
    }

    #[test]
    fn comment_rejected_when_comments_disabled() {
        let conn = setup_db();
        let mut new = new_vent(1, "no comments please");
        new.allow_comments = false;
        let vent = create_vent(&conn, &new).unwrap();
        approve(&conn, &vent.vent_id);

        let err = create_comment(
            &conn,
            &NewComment {
                comment_id: "c-1".to_string(),
                vent_id: vent.vent_id.clone(),
                author_id: 2,
                text: "anyway...".to_string(),
                identity: IdentityDisclosure::Hidden,
            },
        )
        .unwrap_err();
        assert!(matches!(err, RecordError::CommentsDisabled(_)));

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM comments", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0, "nothing should be created");
    }

    #[test]
    fn comment_rejected_when_vent_pending() {
        let conn = setup_db();
        let vent = create_vent(&conn, &new_vent(1, "still in review")).unwrap();

        let err = check_comment_target(&conn, &vent.vent_id).unwrap_err();
        assert!(matches!(err, RecordError::NotPublished(_)));
    }

    #[test]
    fn comment_rejected_on_missing_vent() {
        let conn = setup_db();

        let err = create_comment(
            &conn,
            &NewComment {
                comment_id: "c-1".to_string(),
                vent_id: "ghost".to_string(),
                author_id: 2,
                text: "hello?".to_string(),
                identity: IdentityDisclosure::Hidden,
            },
        )
        .unwrap_err();
        assert!(matches!(err, RecordError::VentNotFound(_)));
    }

    #[test]
    fn comment_disclosure_independent_of_parent() {
        let conn = setup_db();
        let mut new = new_vent(1, "shown vent");
        new.identity = IdentityDisclosure::Shown("1".to_string());
        let vent = create_vent(&conn, &new).unwrap();
        approve(&conn, &vent.vent_id);

        let comment = create_comment(
            &conn,
            &NewComment {
                comment_id: "c-1".to_string(),
                vent_id: vent.vent_id.clone(),
                author_id: 1,
                text: "same author, hidden this time".to_string(),
                identity: IdentityDisclosure::Hidden,
            },
        )
        .unwrap();

        assert!(comment.identity.is_hidden());
        assert_eq!(
            get_vent(&conn, &vent.vent_id).unwrap().identity,
            IdentityDisclosure::Shown("1".to_string())
        );
    }
}
