//! Metrics collection for the signaling boundary
//!
//! Lightweight process-local counters surfaced on `/health`; no external
//! metrics backend.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

/// Signaling server metrics collector
#[derive(Default)]
pub struct Metrics {
    /// Offers accepted since startup
    offers_submitted: AtomicU64,

    /// Answers accepted since startup (== sessions paired)
    answers_submitted: AtomicU64,

    /// Candidate records accepted since startup
    candidates_submitted: AtomicU64,

    /// Offer/answer documents served since startup
    documents_served: AtomicU64,

    /// Candidate list snapshots served since startup
    candidate_lists_served: AtomicU64,

    /// Requests rejected with a protocol error (4xx)
    requests_rejected: AtomicU64,

    /// Startup timestamp (unix seconds)
    startup_time: AtomicU64,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        Self {
            startup_time: AtomicU64::new(now),
            ..Default::default()
        }
    }

    pub fn offer_submitted(&self) {
        self.offers_submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn answer_submitted(&self) {
        self.answers_submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn candidate_submitted(&self) {
        self.candidates_submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn document_served(&self) {
        self.documents_served.fetch_add(1, Ordering::Relaxed);
    }

    pub fn candidate_list_served(&self) {
        self.candidate_lists_served.fetch_add(1, Ordering::Relaxed);
    }

    pub fn request_rejected(&self) {
        self.requests_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let startup = self.startup_time.load(Ordering::Relaxed);

        MetricsSnapshot {
            offers_submitted: self.offers_submitted.load(Ordering::Relaxed),
            answers_submitted: self.answers_submitted.load(Ordering::Relaxed),
            candidates_submitted: self.candidates_submitted.load(Ordering::Relaxed),
            documents_served: self.documents_served.load(Ordering::Relaxed),
            candidate_lists_served: self.candidate_lists_served.load(Ordering::Relaxed),
            requests_rejected: self.requests_rejected.load(Ordering::Relaxed),
            uptime_seconds: now.saturating_sub(startup),
        }
    }
}

/// Point-in-time view of the counters
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub offers_submitted: u64,
    pub answers_submitted: u64,
    pub candidates_submitted: u64,
    pub documents_served: u64,
    pub candidate_lists_served: u64,
    pub requests_rejected: u64,
    pub uptime_seconds: u64,
}
