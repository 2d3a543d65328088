//! Error types for the sigrelay core

use thiserror::Error;

/// Result type alias for sigrelay core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the signaling exchange
///
/// Every failure is scoped to the single request that triggered it; the core
/// performs no internal retries. `NotFound` from a retrieval operation is a
/// legitimate retry-worthy condition (the other party has not arrived yet),
/// not a fault.
#[derive(Debug, Error)]
pub enum Error {
    /// Duplicate session for a secret, double pairing, or document resubmission
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Session, participant role, or document absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Participant does not belong to the session named by the secret
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// A third participant attempted to join a two-party session
    #[error("Session already has two participants")]
    SessionFull,

    /// Missing required field or malformed document
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Underlying SQLite error
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Document (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
