use assert_matches::assert_matches;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::{BookingError, FinalizeOutcome, HttpBookingBackend};
use appointment_cell::services::backend::BookingBackend;
use schedule_cell::{SessionKind, SlotStatus};
use shared_config::AppConfig;

fn config_for(server: &MockServer) -> AppConfig {
    AppConfig {
        marketplace_base_url: server.uri(),
        marketplace_api_key: "test-api-key".to_string(),
        reconcile_grace_delay_secs: 2,
        reconcile_retry_interval_secs: 3,
        reconcile_max_attempts: 5,
    }
}

fn session_json(id: Uuid, occupant: Option<Uuid>) -> serde_json::Value {
    json!({
        "id": id,
        "doctor_id": Uuid::new_v4(),
        "doctor_name": "Alice Smith",
        "date": "2025-06-10T00:00:00Z",
        "kind": "video",
        "hospital": null,
        "slots": [
            {
                "start_time": "09:00:00",
                "end_time": "09:30:00",
                "status": if occupant.is_some() { "booked" } else { "available" },
                "occupant_id": occupant,
                "payment": null,
                "meeting_id": null
            }
        ]
    })
}

#[tokio::test]
async fn get_session_sends_auth_headers_and_parses_the_snapshot() {
    let server = MockServer::start().await;
    let session_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/api/v1/sessions/{}", session_id)))
        .and(header("x-api-key", "test-api-key"))
        .and(header("authorization", "Bearer patient-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_json(session_id, None)))
        .expect(1)
        .mount(&server)
        .await;

    let backend = HttpBookingBackend::new(&config_for(&server));
    let session = backend.get_session(session_id, "patient-token").await.unwrap();

    assert_eq!(session.id, session_id);
    assert_eq!(session.kind, SessionKind::Video);
    assert_eq!(session.slots.len(), 1);
    assert_eq!(session.slots[0].status, SlotStatus::Available);
}

#[tokio::test]
async fn finalize_parses_the_booked_outcome_tag() {
    let server = MockServer::start().await;
    let session_id = Uuid::new_v4();
    let patient = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path(format!("/api/v1/sessions/{}/slots/0/finalize", session_id)))
        .and(body_json(json!({ "payment_intent_id": "pi_test_123" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "outcome": "booked",
            "session": session_json(session_id, Some(patient)),
            "slot_index": 0
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = HttpBookingBackend::new(&config_for(&server));
    let outcome = backend
        .finalize_booking(session_id, 0, "pi_test_123", "patient-token")
        .await
        .unwrap();

    assert_matches!(outcome, FinalizeOutcome::Booked { session, slot_index: 0 } => {
        assert_eq!(session.slots[0].occupant_id, Some(patient));
    });
}

#[tokio::test]
async fn finalize_distinguishes_conflict_from_not_ready_by_tag_alone() {
    let server = MockServer::start().await;
    let session_id = Uuid::new_v4();

    // The reason strings are deliberately swapped relative to their
    // tags; classification must come from the tag.
    Mock::given(method("POST"))
        .and(path(format!("/api/v1/sessions/{}/slots/0/finalize", session_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "outcome": "conflict",
            "reason": "payment not yet visible"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/api/v1/sessions/{}/slots/1/finalize", session_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "outcome": "not_ready",
            "reason": "slot taken"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = HttpBookingBackend::new(&config_for(&server));

    let outcome = backend
        .finalize_booking(session_id, 0, "pi_test_123", "token")
        .await
        .unwrap();
    assert_matches!(outcome, FinalizeOutcome::Conflict { .. });

    let outcome = backend
        .finalize_booking(session_id, 1, "pi_test_123", "token")
        .await
        .unwrap();
    assert_matches!(outcome, FinalizeOutcome::NotReady { .. });
}

#[tokio::test]
async fn attach_meeting_returns_the_backend_echo() {
    let server = MockServer::start().await;
    let session_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path(format!("/api/v1/sessions/{}/slots/0/meeting", session_id)))
        .and(body_json(json!({ "meeting_id": "local-candidate" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meeting_id": "already-attached-by-peer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = HttpBookingBackend::new(&config_for(&server));
    let canonical = backend
        .attach_meeting(session_id, 0, "local-candidate", "token")
        .await
        .unwrap();

    assert_eq!(canonical, "already-attached-by-peer");
}

#[tokio::test]
async fn server_errors_surface_as_backend_errors() {
    let server = MockServer::start().await;
    let session_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/api/v1/sessions/{}", session_id)))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let backend = HttpBookingBackend::new(&config_for(&server));
    let result = backend.get_session(session_id, "token").await;

    assert_matches!(result, Err(BookingError::Backend(_)));
}
