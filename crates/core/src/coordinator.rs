//! Signaling coordinator: the protocol state machine
//!
//! Ties the hasher, store, and ledger together. A session moves
//! `AwaitingInitiator -> AwaitingResponder -> Paired` as the two parties
//! arrive; candidates keep flowing once paired. Retrieval never blocks on
//! the other party - absent data is `NotFound` and the caller polls.

use std::sync::Arc;
use tracing::{debug, info};

use crate::db::SignalingDb;
use crate::document::DocumentBody;
use crate::ledger::ExchangeLedger;
use crate::secret::SessionKey;
use crate::session::{ParticipantId, Role, SessionId, SessionPhase};
use crate::store::RendezvousStore;
use crate::{Error, Result};

pub struct SignalingCoordinator {
    store: RendezvousStore,
    ledger: ExchangeLedger,
}

impl SignalingCoordinator {
    pub fn new(db: Arc<SignalingDb>) -> Self {
        Self {
            store: RendezvousStore::new(db.clone()),
            ledger: ExchangeLedger::new(db),
        }
    }

    /// Publish an offer under a fresh secret.
    ///
    /// Creates the session and its initiator in one protocol step; fails
    /// with `Conflict` if the secret already names a session. Moves the
    /// session to `AwaitingResponder`.
    pub fn submit_offer(&self, secret: &str, offer: DocumentBody) -> Result<ParticipantId> {
        let key = self.key_for(secret)?;
        let session = self.store.create_session(&key)?;
        let (participant, role) = self.store.add_participant(session)?;
        debug_assert_eq!(role, Role::Initiator);
        self.ledger.put_document(participant, &offer)?;

        info!(
            session_id = session.0,
            participant_id = participant.0,
            key = key.log_prefix(),
            "offer submitted, awaiting responder"
        );
        Ok(participant)
    }

    /// Join an existing session as the responder and publish the answer.
    ///
    /// Fails with `NotFound` when no session exists for the secret and with
    /// `Conflict` when the session is already paired. Moves the session to
    /// `Paired`.
    pub fn submit_answer(&self, secret: &str, answer: DocumentBody) -> Result<ParticipantId> {
        let key = self.key_for(secret)?;
        let session = self.store.get_session(&key)?;

        match self.phase(session)? {
            SessionPhase::AwaitingResponder => {}
            SessionPhase::Paired => {
                return Err(Error::Conflict("session is already paired".to_string()))
            }
            // Offer submission creates session and initiator together, so an
            // initiator-less session is unreachable; reject it all the same.
            SessionPhase::AwaitingInitiator => {
                return Err(Error::Conflict("session has no initiator".to_string()))
            }
        }

        // Lost races with another responder surface as SessionFull here.
        let (participant, role) = self.store.add_participant(session)?;
        debug_assert_eq!(role, Role::Responder);
        self.ledger.put_document(participant, &answer)?;

        info!(
            session_id = session.0,
            participant_id = participant.0,
            key = key.log_prefix(),
            "answer submitted, session paired"
        );
        Ok(participant)
    }

    /// Retrieve the initiator's offer.
    ///
    /// `NotFound` until the offer is available - a retry-worthy condition,
    /// not a fault.
    pub fn fetch_offer(&self, secret: &str) -> Result<DocumentBody> {
        self.fetch_document(secret, Role::Initiator)
    }

    /// Retrieve the responder's answer. `NotFound` until paired.
    pub fn fetch_answer(&self, secret: &str) -> Result<DocumentBody> {
        self.fetch_document(secret, Role::Responder)
    }

    /// Append a candidate for one of the session's own participants.
    ///
    /// The participant must belong to the session named by the secret;
    /// anything else is `Forbidden` (blocks cross-session injection). No
    /// state change; candidates flow indefinitely once submitted.
    pub fn submit_candidate(
        &self,
        secret: &str,
        participant: ParticipantId,
        candidate: DocumentBody,
    ) -> Result<()> {
        let key = self.key_for(secret)?;
        let session = self.store.get_session(&key)?;

        let participants = self.store.list_participants(session)?;
        if !participants.iter().any(|(id, _)| *id == participant) {
            return Err(Error::Forbidden(
                "participant does not belong to this session".to_string(),
            ));
        }

        self.ledger.append_candidate(participant, &candidate)?;
        debug!(
            session_id = session.0,
            participant_id = participant.0,
            "candidate appended"
        );
        Ok(())
    }

    /// Snapshot of a role's candidates in append order. The caller polls;
    /// there is no push mechanism.
    pub fn fetch_candidates(&self, secret: &str, role: Role) -> Result<Vec<DocumentBody>> {
        let key = self.key_for(secret)?;
        let session = self.store.get_session(&key)?;
        let participant = self.store.get_participant(session, role)?;
        self.ledger.list_candidates(participant)
    }

    fn fetch_document(&self, secret: &str, role: Role) -> Result<DocumentBody> {
        let key = self.key_for(secret)?;
        let session = self.store.get_session(&key)?;
        let not_yet = || Error::NotFound(format!("{} not yet available", role.document_name()));
        let participant = match self.store.get_participant(session, role) {
            Ok(participant) => participant,
            Err(Error::NotFound(_)) => return Err(not_yet()),
            Err(e) => return Err(e),
        };
        match self.ledger.get_document(participant) {
            Ok(document) => Ok(document),
            Err(Error::NotFound(_)) => Err(not_yet()),
            Err(e) => Err(e),
        }
    }

    fn phase(&self, session: SessionId) -> Result<SessionPhase> {
        let participants = self.store.list_participants(session)?;
        Ok(SessionPhase::from_participant_count(participants.len()))
    }

    fn key_for(&self, secret: &str) -> Result<SessionKey> {
        if secret.is_empty() {
            return Err(Error::InvalidInput("secret must not be empty".to_string()));
        }
        Ok(SessionKey::derive(secret))
    }
}
