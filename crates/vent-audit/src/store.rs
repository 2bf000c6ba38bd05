//! Persistence operations for the audit log.
//!
//! All writes go through [`record_event`], which serialises the payload,
//! assigns a monotonically increasing sequence number, and inserts into
//! the `audit_log` table in a single statement. Reads go through
//! [`query_events`], which supports filtering by domain, event type,
//! entity, and time with a result limit.

use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::error::AuditError;
use crate::event::{AuditDomain, AuditPayload};

/// A row from the audit log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditEvent {
    /// Internal database ID.
    pub id: i64,
    /// Domain label (`SUBMISSION` or `MODERATION`).
    pub domain: String,
    /// Event type string (e.g. `VENT_APPROVED`).
    pub event_type: String,
    /// Entity type string (`vent` or `comment`).
    pub entity_type: String,
    /// Public ID of the entity the event is about.
    pub entity_id: String,
    /// Monotonically increasing sequence number.
    pub seq: i64,
    /// JSON-serialised [`AuditPayload`].
    pub payload_json: String,
    /// Timestamp (ISO 8601).
    pub occurred_at: String,
}

/// Writes a single event to the audit log.
///
/// The domain, event type, entity type, and entity ID are derived from
/// the payload. The sequence number is computed inside the INSERT itself
/// (`COALESCE(MAX(seq), 0) + 1`), so two concurrent writers can never
/// observe the same maximum and produce duplicates.
///
/// # Errors
///
/// Returns `AuditError::Database` on SQL failure or
/// `AuditError::Serialization` if the payload cannot be serialised.
pub fn record_event(conn: &Connection, payload: &AuditPayload) -> Result<AuditEvent, AuditError> {
    let payload_json = serde_json::to_string(payload)?;
    let domain = payload.domain();

    let (id, seq, occurred_at) = conn.query_row(
        "INSERT INTO audit_log (domain, event_type, entity_type, entity_id, seq, payload_json, occurred_at)
         VALUES (
            ?1, ?2, ?3, ?4,
            (SELECT COALESCE(MAX(seq), 0) + 1 FROM audit_log),
            ?5,
            datetime('now')
         )
         RETURNING id, seq, occurred_at",
        params![
            domain.as_str(),
            payload.event_type(),
            payload.entity_type(),
            payload.entity_id(),
            payload_json,
        ],
        |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
            ))
        },
    )?;

    Ok(AuditEvent {
        id,
        domain: domain.as_str().to_string(),
        event_type: payload.event_type().to_string(),
        entity_type: payload.entity_type().to_string(),
        entity_id: payload.entity_id().to_string(),
        seq,
        payload_json,
        occurred_at,
    })
}

/// Filter criteria for querying the audit log.
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    /// Filter by event domain.
    pub domain: Option<AuditDomain>,
    /// Filter by event type string.
    pub event_type: Option<String>,
    /// Filter by entity ID.
    pub entity_id: Option<String>,
    /// Return events that occurred at or after this ISO 8601 timestamp.
    pub since: Option<String>,
    /// Maximum number of events to return (default: 100).
    pub limit: Option<i64>,
}

/// Queries the audit log with optional filters.
///
/// Results are returned in sequence order (oldest first), bounded by
/// `filter.limit` (default 100).
///
/// # Errors
///
/// Returns `AuditError::Database` on SQL failure.
pub fn query_events(conn: &Connection, filter: &AuditFilter) -> Result<Vec<AuditEvent>, AuditError> {
    // WHERE clauses and bind parameters are collected separately so that
    // nothing user-supplied is ever interpolated into the SQL text.
    let mut clauses: Vec<String> = Vec::new();
    let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
    let mut idx = 1u32;

    if let Some(domain) = filter.domain {
        clauses.push(format!("domain = ?{idx}"));
        param_values.push(Box::new(domain.as_str().to_string()));
        idx += 1;
    }

    if let Some(ref et) = filter.event_type {
        clauses.push(format!("event_type = ?{idx}"));
        param_values.push(Box::new(et.clone()));
        idx += 1;
    }

    if let Some(ref ent_id) = filter.entity_id {
        clauses.push(format!("entity_id = ?{idx}"));
        param_values.push(Box::new(ent_id.clone()));
        idx += 1;
    }

    if let Some(ref since) = filter.since {
        clauses.push(format!("occurred_at >= ?{idx}"));
        param_values.push(Box::new(since.clone()));
        idx += 1;
    }

    let limit = filter.limit.unwrap_or(100);
    let where_clause = if clauses.is_empty() {
        "1 = 1".to_string()
    } else {
        clauses.join(" AND ")
    };
    let sql = format!(
        "SELECT id, domain, event_type, entity_type, entity_id, seq, payload_json, occurred_at
         FROM audit_log
         WHERE {where_clause}
         ORDER BY seq ASC
         LIMIT ?{idx}"
    );

    param_values.push(Box::new(limit));

    let params_refs: Vec<&dyn rusqlite::types::ToSql> = param_values.iter().map(|p| &**p).collect();

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_refs.as_slice(), |row| {
        Ok(AuditEvent {
            id: row.get(0)?,
            domain: row.get(1)?,
            event_type: row.get(2)?,
            entity_type: row.get(3)?,
            entity_id: row.get(4)?,
            seq: row.get(5)?,
            payload_json: row.get(6)?,
            occurred_at: row.get(7)?,
        })
    })?;

    let mut events = Vec::new();
    for row in rows {
        events.push(row?);
    }

    Ok(events)
}
