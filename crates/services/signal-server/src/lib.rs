//! REST signaling boundary for the sigrelay rendezvous service
//!
//! A thin axum layer over [`sigrelay_core`]: request parsing, error-kind to
//! HTTP-status mapping, CORS for browser peers, and a health endpoint. All
//! protocol decisions live in the core; this crate only carries them over
//! the wire.

pub mod api;
pub mod config;
pub mod metrics;

pub use config::ServerConfig;
pub use metrics::Metrics;
