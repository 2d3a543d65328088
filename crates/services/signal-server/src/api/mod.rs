//! REST API for the signaling exchange
//!
//! Route layout mirrors the classic offer/answer signaling shape: every
//! exchange operation is a POST with a JSON body (secrets never travel in
//! URLs or query strings), plus a GET health probe.

pub mod signaling;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use sigrelay_core::SignalingCoordinator;

use crate::metrics::{Metrics, MetricsSnapshot};

/// Shared state across all request handlers
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<SignalingCoordinator>,
    pub metrics: Arc<Metrics>,
}

/// Build the service router.
///
/// `permissive_cors` opens the API to browser peers on any origin; the
/// secret-derived lookup key is the only credential this service knows.
pub fn router(state: AppState, permissive_cors: bool) -> Router {
    let mut router = Router::new()
        .route("/health", get(health))
        .route("/api/v1/add-offer-sd", post(signaling::add_offer))
        .route("/api/v1/add-answer-sd", post(signaling::add_answer))
        .route("/api/v1/get-offer-sd", post(signaling::get_offer))
        .route("/api/v1/get-answer-sd", post(signaling::get_answer))
        .route("/api/v1/add-ice-candidate", post(signaling::add_candidate))
        .route(
            "/api/v1/get-offer-ice-candidates",
            post(signaling::get_offer_candidates),
        )
        .route(
            "/api/v1/get-answer-ice-candidates",
            post(signaling::get_answer_candidates),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if permissive_cors {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router
}

/// Health and metrics snapshot
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    metrics: MetricsSnapshot,
}

/// GET /health
async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        metrics: state.metrics.snapshot(),
    })
}
