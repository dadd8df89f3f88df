use chrono::{TimeZone, Utc};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use schedule_cell::{AvailabilityLabel, ScheduleService, SessionKind};
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

#[tokio::test]
async fn fetches_a_snapshot_and_evaluates_it() {
    let server = MockServer::start().await;
    let session_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/api/v1/sessions/{}", session_id)))
        .and(header("x-api-key", "test-api-key"))
        .and(header("authorization", "Bearer patient-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": session_id,
            "doctor_id": Uuid::new_v4(),
            "doctor_name": "Alice Smith",
            "date": "2025-06-11T00:00:00Z",
            "kind": "video",
            "hospital": null,
            "slots": [
                {
                    "start_time": "09:00:00",
                    "end_time": "09:30:00",
                    "status": "available",
                    "occupant_id": null,
                    "payment": null,
                    "meeting_id": null
                },
                {
                    "start_time": "09:30:00",
                    "end_time": "10:00:00",
                    "status": "booked",
                    "occupant_id": Uuid::new_v4(),
                    "payment": null,
                    "meeting_id": null
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let service = ScheduleService::new(&config_for(&server));
    let now = Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap();

    let availability = service
        .evaluate_availability(session_id, now, "patient-token")
        .await
        .unwrap();

    assert_eq!(availability.available, 1);
    assert_eq!(availability.booked, 1);
    assert!(availability.has_available);
    assert_eq!(availability.label, AvailabilityLabel::BookAppointment);
}

#[tokio::test]
async fn missing_session_surfaces_a_not_found_error() {
    let server = MockServer::start().await;
    let session_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/api/v1/sessions/{}", session_id)))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such session"))
        .expect(1)
        .mount(&server)
        .await;

    let service = ScheduleService::new(&config_for(&server));
    let result = service.get_session(session_id, "patient-token").await;

    let err = result.unwrap_err();
    assert!(err.to_string().contains("Resource not found"));
}

#[tokio::test]
async fn session_kind_tag_is_parsed_not_inferred() {
    let server = MockServer::start().await;
    let session_id = Uuid::new_v4();

    // A hospital reference on a video-tagged session does not flip it
    // to in-person.
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/sessions/{}", session_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": session_id,
            "doctor_id": Uuid::new_v4(),
            "doctor_name": "Alice Smith",
            "date": "2025-06-11T00:00:00Z",
            "kind": "video",
            "hospital": { "id": Uuid::new_v4(), "name": "City General" },
            "slots": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let service = ScheduleService::new(&config_for(&server));
    let session = service.get_session(session_id, "patient-token").await.unwrap();

    assert_eq!(session.kind, SessionKind::Video);
    assert!(session.hospital.is_some());
}
