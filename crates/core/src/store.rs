//! Rendezvous store: durable session and participant registry
//!
//! Owns the identity and ordering invariants of the exchange: lookup keys
//! are unique across sessions, a session holds at most two participants,
//! and roles are assigned strictly first-come-first-served.

use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use std::sync::Arc;
use tracing::debug;

use crate::db::{is_unique_violation, SignalingDb};
use crate::secret::SessionKey;
use crate::session::{ParticipantId, Role, SessionId};
use crate::{Error, Result};

pub struct RendezvousStore {
    db: Arc<SignalingDb>,
}

impl RendezvousStore {
    pub fn new(db: Arc<SignalingDb>) -> Self {
        Self { db }
    }

    /// Create a session for a lookup key.
    ///
    /// Fails with `Conflict` if the key is already taken; an existing
    /// session is never overwritten.
    pub fn create_session(&self, key: &SessionKey) -> Result<SessionId> {
        self.db.with_conn(|conn| {
            let insert = conn.execute(
                "INSERT INTO sessions (lookup_key, created_at) VALUES (?1, ?2)",
                params![key.as_str(), Utc::now().timestamp()],
            );
            match insert {
                Ok(_) => {
                    let id = SessionId(conn.last_insert_rowid());
                    debug!(session_id = id.0, key = key.log_prefix(), "session created");
                    Ok(id)
                }
                Err(e) if is_unique_violation(&e) => Err(Error::Conflict(
                    "a session already exists for this secret".to_string(),
                )),
                Err(e) => Err(e.into()),
            }
        })
    }

    /// Resolve a lookup key to its session.
    pub fn get_session(&self, key: &SessionKey) -> Result<SessionId> {
        self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT id FROM sessions WHERE lookup_key = ?1",
                params![key.as_str()],
                |row| row.get::<_, i64>(0),
            )
            .optional()?
            .map(SessionId)
            .ok_or_else(|| Error::NotFound("no session exists for this secret".to_string()))
        })
    }

    /// Atomically join a session.
    ///
    /// The first joiner becomes the initiator, the second the responder; a
    /// third attempt fails with `SessionFull`. Count, assignment, and insert
    /// happen inside one transaction so concurrent joiners serialize and the
    /// `UNIQUE(session_id, role)` constraint can never be raced past.
    pub fn add_participant(&self, session: SessionId) -> Result<(ParticipantId, Role)> {
        self.db.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let exists: Option<i64> = tx
                .query_row(
                    "SELECT id FROM sessions WHERE id = ?1",
                    params![session.0],
                    |row| row.get(0),
                )
                .optional()?;
            if exists.is_none() {
                return Err(Error::NotFound("session does not exist".to_string()));
            }

            let count: i64 = tx.query_row(
                "SELECT COUNT(*) FROM participants WHERE session_id = ?1",
                params![session.0],
                |row| row.get(0),
            )?;
            let role = match count {
                0 => Role::Initiator,
                1 => Role::Responder,
                _ => return Err(Error::SessionFull),
            };

            tx.execute(
                "INSERT INTO participants (session_id, role, joined_at) VALUES (?1, ?2, ?3)",
                params![session.0, role.as_str(), Utc::now().timestamp()],
            )?;
            let id = ParticipantId(tx.last_insert_rowid());
            tx.commit()?;

            debug!(
                session_id = session.0,
                participant_id = id.0,
                role = %role,
                "participant joined"
            );
            Ok((id, role))
        })
    }

    /// Look up the participant holding `role`, if that role has joined yet.
    pub fn get_participant(&self, session: SessionId, role: Role) -> Result<ParticipantId> {
        self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT id FROM participants WHERE session_id = ?1 AND role = ?2",
                params![session.0, role.as_str()],
                |row| row.get::<_, i64>(0),
            )
            .optional()?
            .map(ParticipantId)
            .ok_or_else(|| {
                Error::NotFound(format!("no {role} has joined this session yet"))
            })
        })
    }

    /// All participants of a session in join order.
    pub fn list_participants(&self, session: SessionId) -> Result<Vec<(ParticipantId, Role)>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, role FROM participants WHERE session_id = ?1 ORDER BY id",
            )?;
            let rows = stmt.query_map(params![session.0], |row| {
                Ok((ParticipantId(row.get(0)?), row.get::<_, Role>(1)?))
            })?;
            let mut participants = Vec::new();
            for row in rows {
                participants.push(row?);
            }
            Ok(participants)
        })
    }
}
