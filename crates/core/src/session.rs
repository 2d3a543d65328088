//! Session identity, participant roles, and lifecycle phases

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a rendezvous session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub i64);

/// Identifier of a participant within a session
///
/// Participant ids are allocated by the store in join order, so within a
/// session the initiator's id always sorts before the responder's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub i64);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fixed role within a session, assigned by arrival order
///
/// The first participant to join is the initiator and owns the offer; the
/// second is the responder and owns the answer. The role is assigned
/// atomically at join time and is immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// First joiner; submits the offer
    Initiator,
    /// Second joiner; submits the answer
    Responder,
}

impl Role {
    /// Storage/wire representation of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Initiator => "initiator",
            Role::Responder => "responder",
        }
    }

    /// Parse the storage representation back into a role
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "initiator" => Some(Role::Initiator),
            "responder" => Some(Role::Responder),
            _ => None,
        }
    }

    /// Name of the negotiation document this role owns
    pub fn document_name(&self) -> &'static str {
        match self {
            Role::Initiator => "offer",
            Role::Responder => "answer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromSql for Role {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        Role::parse(text)
            .ok_or_else(|| FromSqlError::Other(format!("unknown role: {text}").into()))
    }
}

/// Lifecycle phase of a session, derived from its participant count
///
/// `AwaitingInitiator -> AwaitingResponder -> Paired`; there is no further
/// transition. Candidates continue to flow while `Paired`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No participants yet (only observable mid-creation)
    AwaitingInitiator,
    /// Offer submitted; waiting for the responder to join
    AwaitingResponder,
    /// Both parties present; exchange restricted to candidates
    Paired,
}

impl SessionPhase {
    /// Derive the phase from the number of joined participants.
    pub fn from_participant_count(count: usize) -> Self {
        match count {
            0 => SessionPhase::AwaitingInitiator,
            1 => SessionPhase::AwaitingResponder,
            _ => SessionPhase::Paired,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_storage_form() {
        for role in [Role::Initiator, Role::Responder] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("observer"), None);
    }

    #[test]
    fn phase_follows_participant_count() {
        assert_eq!(SessionPhase::from_participant_count(0), SessionPhase::AwaitingInitiator);
        assert_eq!(SessionPhase::from_participant_count(1), SessionPhase::AwaitingResponder);
        assert_eq!(SessionPhase::from_participant_count(2), SessionPhase::Paired);
        // A third participant can never be stored, but the derivation stays total
        assert_eq!(SessionPhase::from_participant_count(3), SessionPhase::Paired);
    }
}
