//! End-to-end tests of the signaling exchange protocol
//!
//! Drives the coordinator through complete rendezvous scenarios, including
//! the racy ones a single-module unit test cannot cover.

use std::sync::Arc;

use serde_json::json;
use sigrelay_core::{
    DocumentBody, Error, Role, SignalingCoordinator, SignalingDb,
};

fn body(value: serde_json::Value) -> DocumentBody {
    DocumentBody::new(value).unwrap()
}

#[test]
fn full_rendezvous_under_secret_alpha() {
    let coordinator = SignalingCoordinator::new(SignalingDb::open_in_memory().unwrap());

    // Initiator arrives first
    let initiator = coordinator
        .submit_offer("alpha", body(json!({"sdp": "O1"})))
        .unwrap();

    // Nothing to answer with yet
    assert!(matches!(
        coordinator.fetch_answer("alpha"),
        Err(Error::NotFound(_))
    ));

    // Responder joins under the same secret
    let responder = coordinator
        .submit_answer("alpha", body(json!({"sdp": "A1"})))
        .unwrap();
    assert_ne!(initiator, responder);

    // Both documents round-trip unchanged
    assert_eq!(
        coordinator.fetch_offer("alpha").unwrap(),
        body(json!({"sdp": "O1"}))
    );
    assert_eq!(
        coordinator.fetch_answer("alpha").unwrap(),
        body(json!({"sdp": "A1"}))
    );

    // Trickled candidates come back in submission order
    coordinator
        .submit_candidate("alpha", initiator, body(json!({"cand": "c1"})))
        .unwrap();
    coordinator
        .submit_candidate("alpha", initiator, body(json!({"cand": "c2"})))
        .unwrap();
    assert_eq!(
        coordinator.fetch_candidates("alpha", Role::Initiator).unwrap(),
        vec![body(json!({"cand": "c1"})), body(json!({"cand": "c2"}))]
    );
}

#[test]
fn sessions_under_different_secrets_are_independent() {
    let coordinator = SignalingCoordinator::new(SignalingDb::open_in_memory().unwrap());

    coordinator.submit_offer("alpha", body(json!({"sdp": "OA"}))).unwrap();
    coordinator.submit_offer("beta", body(json!({"sdp": "OB"}))).unwrap();

    assert_eq!(coordinator.fetch_offer("alpha").unwrap(), body(json!({"sdp": "OA"})));
    assert_eq!(coordinator.fetch_offer("beta").unwrap(), body(json!({"sdp": "OB"})));

    // Pairing one session leaves the other awaiting its responder
    coordinator.submit_answer("alpha", body(json!({"sdp": "AA"}))).unwrap();
    assert!(matches!(
        coordinator.fetch_answer("beta"),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn concurrent_answers_pair_exactly_once() {
    let coordinator = Arc::new(SignalingCoordinator::new(
        SignalingDb::open_in_memory().unwrap(),
    ));
    coordinator
        .submit_offer("alpha", body(json!({"sdp": "O1"})))
        .unwrap();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let coordinator = Arc::clone(&coordinator);
            std::thread::spawn(move || {
                coordinator.submit_answer("alpha", body(json!({"sdp": format!("A{i}")})))
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one concurrent responder may win");
    for result in results.iter().filter(|r| r.is_err()) {
        assert!(matches!(
            result.as_ref().unwrap_err(),
            Error::Conflict(_) | Error::SessionFull
        ));
    }

    // The surviving answer is one of the contenders, intact
    let answer = coordinator.fetch_answer("alpha").unwrap();
    let sdp = answer.as_value()["sdp"].as_str().unwrap().to_string();
    assert!(sdp.starts_with('A'));
}

#[test]
fn concurrent_offers_create_exactly_one_session() {
    let coordinator = Arc::new(SignalingCoordinator::new(
        SignalingDb::open_in_memory().unwrap(),
    ));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let coordinator = Arc::clone(&coordinator);
            std::thread::spawn(move || {
                coordinator.submit_offer("alpha", body(json!({"sdp": format!("O{i}")})))
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    for result in results.iter().filter(|r| r.is_err()) {
        assert!(matches!(result.as_ref().unwrap_err(), Error::Conflict(_)));
    }
}

#[test]
fn exchange_survives_process_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("signaling.db");

    let initiator = {
        let coordinator = SignalingCoordinator::new(SignalingDb::open(&path).unwrap());
        let initiator = coordinator
            .submit_offer("alpha", body(json!({"sdp": "O1"})))
            .unwrap();
        coordinator
            .submit_candidate("alpha", initiator, body(json!({"cand": "c1"})))
            .unwrap();
        initiator
    };

    // New handle over the same file sees the full exchange state
    let coordinator = SignalingCoordinator::new(SignalingDb::open(&path).unwrap());
    assert_eq!(
        coordinator.fetch_offer("alpha").unwrap(),
        body(json!({"sdp": "O1"}))
    );
    assert_eq!(
        coordinator.fetch_candidates("alpha", Role::Initiator).unwrap(),
        vec![body(json!({"cand": "c1"}))]
    );

    // And the old participant id still authenticates against its session
    coordinator
        .submit_candidate("alpha", initiator, body(json!({"cand": "c2"})))
        .unwrap();
    coordinator
        .submit_answer("alpha", body(json!({"sdp": "A1"})))
        .unwrap();
    assert_eq!(
        coordinator.fetch_answer("alpha").unwrap(),
        body(json!({"sdp": "A1"}))
    );
}

#[test]
fn wrong_secret_reveals_nothing() {
    let coordinator = SignalingCoordinator::new(SignalingDb::open_in_memory().unwrap());
    let initiator = coordinator
        .submit_offer("alpha", body(json!({"sdp": "O1"})))
        .unwrap();

    assert!(matches!(coordinator.fetch_offer("beta"), Err(Error::NotFound(_))));
    assert!(matches!(
        coordinator.fetch_candidates("beta", Role::Initiator),
        Err(Error::NotFound(_))
    ));
    // Even a valid participant id is useless without the right secret
    assert!(matches!(
        coordinator.submit_candidate("beta", initiator, body(json!({"cand": "c"}))),
        Err(Error::NotFound(_))
    ));
}
