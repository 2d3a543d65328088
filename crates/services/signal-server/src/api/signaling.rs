//! Signaling exchange endpoints
//!
//! Thin handlers over the core coordinator: parse the request, run one
//! protocol operation, map the error kind to an HTTP status. Offer and
//! answer bodies are opaque JSON documents relayed verbatim.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;

use sigrelay_core::{DocumentBody, Error, ParticipantId, Role};

use super::AppState;

/// Request body for submitting an offer
#[derive(Debug, Deserialize)]
pub struct AddOfferRequest {
    /// Shared rendezvous secret
    pub secret: String,

    /// Opaque offer document (SDP payload)
    pub offer: Value,
}

/// Request body for submitting an answer
#[derive(Debug, Deserialize)]
pub struct AddAnswerRequest {
    pub secret: String,

    /// Opaque answer document (SDP payload)
    pub answer: Value,
}

/// Request body for the retrieval endpoints
#[derive(Debug, Deserialize)]
pub struct FetchRequest {
    pub secret: String,
}

/// Request body for submitting a candidate
#[derive(Debug, Deserialize)]
pub struct AddCandidateRequest {
    pub secret: String,

    /// Id returned when this peer submitted its offer or answer
    pub participant_id: ParticipantId,

    /// Opaque candidate document
    pub candidate: Value,
}

/// Response carrying the caller's participant identity
#[derive(Debug, Serialize)]
pub struct ParticipantResponse {
    pub participant_id: ParticipantId,
}

#[derive(Debug, Serialize)]
pub struct OfferResponse {
    pub offer: Value,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub answer: Value,
}

#[derive(Debug, Serialize)]
pub struct CandidatesResponse {
    pub candidates: Vec<Value>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Submit an offer, creating the session
///
/// POST /api/v1/add-offer-sd
pub async fn add_offer(
    State(state): State<AppState>,
    Json(req): Json<AddOfferRequest>,
) -> Response {
    let offer = match DocumentBody::new(req.offer) {
        Ok(body) => body,
        Err(e) => return error_response(&state, e),
    };
    match state.coordinator.submit_offer(&req.secret, offer) {
        Ok(participant) => {
            state.metrics.offer_submitted();
            (
                StatusCode::CREATED,
                Json(ParticipantResponse {
                    participant_id: participant,
                }),
            )
                .into_response()
        }
        Err(e) => error_response(&state, e),
    }
}

/// Submit an answer, pairing the session
///
/// POST /api/v1/add-answer-sd
pub async fn add_answer(
    State(state): State<AppState>,
    Json(req): Json<AddAnswerRequest>,
) -> Response {
    let answer = match DocumentBody::new(req.answer) {
        Ok(body) => body,
        Err(e) => return error_response(&state, e),
    };
    match state.coordinator.submit_answer(&req.secret, answer) {
        Ok(participant) => {
            state.metrics.answer_submitted();
            (
                StatusCode::CREATED,
                Json(ParticipantResponse {
                    participant_id: participant,
                }),
            )
                .into_response()
        }
        Err(e) => error_response(&state, e),
    }
}

/// Retrieve the offer (called by the answering peer)
///
/// POST /api/v1/get-offer-sd
pub async fn get_offer(State(state): State<AppState>, Json(req): Json<FetchRequest>) -> Response {
    match state.coordinator.fetch_offer(&req.secret) {
        Ok(offer) => {
            state.metrics.document_served();
            (
                StatusCode::OK,
                Json(OfferResponse {
                    offer: offer.into_value(),
                }),
            )
                .into_response()
        }
        Err(e) => error_response(&state, e),
    }
}

/// Retrieve the answer (polled by the offering peer)
///
/// POST /api/v1/get-answer-sd
pub async fn get_answer(State(state): State<AppState>, Json(req): Json<FetchRequest>) -> Response {
    match state.coordinator.fetch_answer(&req.secret) {
        Ok(answer) => {
            state.metrics.document_served();
            (
                StatusCode::OK,
                Json(AnswerResponse {
                    answer: answer.into_value(),
                }),
            )
                .into_response()
        }
        Err(e) => error_response(&state, e),
    }
}

/// Append a candidate for one of the session's participants
///
/// POST /api/v1/add-ice-candidate
pub async fn add_candidate(
    State(state): State<AppState>,
    Json(req): Json<AddCandidateRequest>,
) -> Response {
    let candidate = match DocumentBody::new(req.candidate) {
        Ok(body) => body,
        Err(e) => return error_response(&state, e),
    };
    match state
        .coordinator
        .submit_candidate(&req.secret, req.participant_id, candidate)
    {
        Ok(()) => {
            state.metrics.candidate_submitted();
            (StatusCode::CREATED, Json(serde_json::json!({}))).into_response()
        }
        Err(e) => error_response(&state, e),
    }
}

/// Candidates contributed by the initiator, in submission order
///
/// POST /api/v1/get-offer-ice-candidates
pub async fn get_offer_candidates(
    State(state): State<AppState>,
    Json(req): Json<FetchRequest>,
) -> Response {
    fetch_candidates(state, req, Role::Initiator)
}

/// Candidates contributed by the responder, in submission order
///
/// POST /api/v1/get-answer-ice-candidates
pub async fn get_answer_candidates(
    State(state): State<AppState>,
    Json(req): Json<FetchRequest>,
) -> Response {
    fetch_candidates(state, req, Role::Responder)
}

fn fetch_candidates(state: AppState, req: FetchRequest, role: Role) -> Response {
    match state.coordinator.fetch_candidates(&req.secret, role) {
        Ok(candidates) => {
            state.metrics.candidate_list_served();
            (
                StatusCode::OK,
                Json(CandidatesResponse {
                    candidates: candidates
                        .into_iter()
                        .map(DocumentBody::into_value)
                        .collect(),
                }),
            )
                .into_response()
        }
        Err(e) => error_response(&state, e),
    }
}

/// Map a core error to its HTTP representation.
fn error_response(state: &AppState, err: Error) -> Response {
    let (status, code) = match &err {
        Error::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
        Error::SessionFull => (StatusCode::CONFLICT, "session_full"),
        Error::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        Error::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
        Error::InvalidInput(_) => (StatusCode::BAD_REQUEST, "invalid_input"),
        Error::Storage(_) | Error::Serialization(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "internal")
        }
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!(error = %err, "signaling operation failed");
    } else {
        state.metrics.request_rejected();
    }

    (
        status,
        Json(ErrorResponse {
            error: code.to_string(),
            message: err.to_string(),
        }),
    )
        .into_response()
}
