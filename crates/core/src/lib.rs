//! Core signaling exchange for the sigrelay rendezvous service
//!
//! Two peers that cannot yet talk directly rendezvous under a shared
//! human-chosen secret and exchange WebRTC negotiation data (an offer, an
//! answer, and a trickle of ICE candidates) through this relay, then proceed
//! to a direct peer link outside its purview.
//!
//! # Components
//!
//! - **Secret hashing** ([`SessionKey`]): deterministic one-way transform
//!   from the shared secret to a session lookup key. The secret itself is
//!   never persisted or logged.
//! - **Rendezvous store** ([`RendezvousStore`]): durable session registry
//!   with ordered participants and atomic role assignment.
//! - **Exchange ledger** ([`ExchangeLedger`]): one negotiation document per
//!   participant plus an append-only candidate log.
//! - **Coordinator** ([`SignalingCoordinator`]): the protocol state machine
//!   tying the above together.
//! - **Retention** ([`RetentionSweeper`]): TTL cleanup for sessions that were
//!   never paired or have been abandoned.
//!
//! # Usage
//!
//! ```ignore
//! use sigrelay_core::{DocumentBody, Role, SignalingCoordinator, SignalingDb};
//! use serde_json::json;
//!
//! let db = SignalingDb::open_in_memory()?;
//! let coordinator = SignalingCoordinator::new(db);
//!
//! // Initiator publishes an offer under the shared secret.
//! let initiator = coordinator.submit_offer("alpha", DocumentBody::new(json!({"sdp": "v=0..."}))?)?;
//! coordinator.submit_candidate("alpha", initiator, DocumentBody::new(json!({"candidate": "..."}))?)?;
//!
//! // Responder joins with the same secret and answers.
//! let offer = coordinator.fetch_offer("alpha")?;
//! coordinator.submit_answer("alpha", DocumentBody::new(json!({"sdp": "v=0..."}))?)?;
//!
//! // Both sides poll for the other party's candidates.
//! let candidates = coordinator.fetch_candidates("alpha", Role::Initiator)?;
//! ```

pub mod coordinator;
pub mod db;
pub mod document;
pub mod error;
pub mod ledger;
pub mod retention;
pub mod secret;
pub mod session;
pub mod store;

pub use coordinator::SignalingCoordinator;
pub use db::SignalingDb;
pub use document::DocumentBody;
pub use error::{Error, Result};
pub use ledger::ExchangeLedger;
pub use retention::RetentionSweeper;
pub use secret::SessionKey;
pub use session::{ParticipantId, Role, SessionId, SessionPhase};
pub use store::RendezvousStore;
