//! Secret hashing for session rendezvous
//!
//! Peers share a human-chosen secret out of band; the relay only ever sees
//! and stores its SHA-256 digest, which doubles as the session lookup key.

use sha2::{Digest, Sha256};

/// Opaque lookup key derived from a shared secret.
///
/// Deterministic: equal secrets always derive equal keys, so both peers
/// resolve the same session without any pre-existing identity system.
/// There is no inverse transform and the raw secret is never retained.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey(String);

impl SessionKey {
    /// Derive the lookup key for a shared secret (SHA-256, hex-encoded).
    pub fn derive(secret: &str) -> Self {
        let digest = Sha256::digest(secret.as_bytes());
        Self(hex::encode(digest))
    }

    /// Full hex digest, used as the session's storage key.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short prefix for log lines. The full key authenticates requests, so
    /// it never appears in logs.
    pub fn log_prefix(&self) -> &str {
        &self.0[..8]
    }
}
