//! Exchange ledger: negotiation documents and candidate records
//!
//! Append-only per-participant storage. Each participant submits exactly one
//! negotiation document (its offer or answer) and any number of candidate
//! records; candidates are returned in append order, duplicates included.

use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use std::sync::Arc;
use tracing::warn;

use crate::db::{is_unique_violation, SignalingDb};
use crate::document::DocumentBody;
use crate::session::ParticipantId;
use crate::{Error, Result};

pub struct ExchangeLedger {
    db: Arc<SignalingDb>,
}

impl ExchangeLedger {
    pub fn new(db: Arc<SignalingDb>) -> Self {
        Self { db }
    }

    /// Store a participant's negotiation document.
    ///
    /// A second submission for the same participant is a protocol violation
    /// and fails with `Conflict`; the original document is never replaced.
    pub fn put_document(&self, participant: ParticipantId, body: &DocumentBody) -> Result<()> {
        let stored = body.to_stored()?;
        self.db.with_conn(|conn| {
            let insert = conn.execute(
                "INSERT INTO negotiation_documents (participant_id, body, created_at)
                 VALUES (?1, ?2, ?3)",
                params![participant.0, stored, Utc::now().timestamp()],
            );
            match insert {
                Ok(_) => Ok(()),
                Err(e) if is_unique_violation(&e) => Err(Error::Conflict(
                    "a negotiation document was already submitted for this participant"
                        .to_string(),
                )),
                Err(e) => Err(e.into()),
            }
        })
    }

    /// Retrieve a participant's negotiation document.
    pub fn get_document(&self, participant: ParticipantId) -> Result<DocumentBody> {
        self.db.with_conn(|conn| {
            let text = conn
                .query_row(
                    "SELECT body FROM negotiation_documents WHERE participant_id = ?1",
                    params![participant.0],
                    |row| row.get::<_, String>(0),
                )
                .optional()?
                .ok_or_else(|| {
                    Error::NotFound("negotiation document not yet available".to_string())
                })?;
            DocumentBody::from_stored(&text)
        })
    }

    /// Append a candidate record. Always succeeds; no uniqueness check.
    pub fn append_candidate(&self, participant: ParticipantId, body: &DocumentBody) -> Result<()> {
        let stored = body.to_stored()?;
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO candidate_records (participant_id, body, created_at)
                 VALUES (?1, ?2, ?3)",
                params![participant.0, stored, Utc::now().timestamp()],
            )?;
            Ok(())
        })
    }

    /// All candidate records for a participant, in append order.
    ///
    /// A stored row that no longer parses is skipped with a diagnostic so
    /// the remaining good candidates stay available; it never aborts the
    /// whole retrieval.
    pub fn list_candidates(&self, participant: ParticipantId) -> Result<Vec<DocumentBody>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, body FROM candidate_records WHERE participant_id = ?1 ORDER BY id",
            )?;
            let rows = stmt.query_map(params![participant.0], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })?;

            let mut candidates = Vec::new();
            for row in rows {
                let (record_id, text) = row?;
                match DocumentBody::from_stored(&text) {
                    Ok(body) => candidates.push(body),
                    Err(e) => warn!(
                        participant_id = participant.0,
                        record_id,
                        error = %e,
                        "skipping malformed candidate record"
                    ),
                }
            }
            Ok(candidates)
        })
    }
}
