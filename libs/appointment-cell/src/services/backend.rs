// libs/appointment-cell/src/services/backend.rs
use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use schedule_cell::models::Session;
use shared_backend::MarketplaceClient;
use shared_config::AppConfig;

use crate::models::BookingError;

/// Finalize response from the marketplace backend. Enum-level on the
/// wire: the client never infers conflict-vs-transient from message
/// text.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FinalizeOutcome {
    /// The slot is durably booked for this patient. Repeating the call
    /// with the same payment intent id is a backend-guaranteed no-op
    /// returning the same result.
    Booked { session: Session, slot_index: usize },
    /// The slot is occupied by a different reservation.
    Conflict { reason: String },
    /// The payment is not yet visible to the backend; finalization may
    /// succeed later.
    NotReady { reason: String },
}

/// The marketplace backend collaborator as this cell consumes it. The
/// backend owns slot state and the single-occupant invariant; this
/// side only reads snapshots and issues single mutating calls.
#[async_trait]
pub trait BookingBackend: Send + Sync {
    async fn get_session(&self, session_id: Uuid, auth_token: &str)
        -> Result<Session, BookingError>;

    async fn finalize_booking(
        &self,
        session_id: Uuid,
        slot_index: usize,
        payment_intent_id: &str,
        auth_token: &str,
    ) -> Result<FinalizeOutcome, BookingError>;

    /// Attach a realtime meeting id to a booked slot. Returns the
    /// canonical id, which may differ from the supplied one if another
    /// client attached first.
    async fn attach_meeting(
        &self,
        session_id: Uuid,
        slot_index: usize,
        meeting_id: &str,
        auth_token: &str,
    ) -> Result<String, BookingError>;
}

#[derive(Debug, Deserialize)]
struct AttachMeetingResponse {
    meeting_id: String,
}

/// HTTP implementation over the shared marketplace client.
pub struct HttpBookingBackend {
    client: MarketplaceClient,
}

impl HttpBookingBackend {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: MarketplaceClient::new(config),
        }
    }
}

#[async_trait]
impl BookingBackend for HttpBookingBackend {
    async fn get_session(
        &self,
        session_id: Uuid,
        auth_token: &str,
    ) -> Result<Session, BookingError> {
        let path = format!("/api/v1/sessions/{}", session_id);
        self.client
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| BookingError::Backend(e.to_string()))
    }

    async fn finalize_booking(
        &self,
        session_id: Uuid,
        slot_index: usize,
        payment_intent_id: &str,
        auth_token: &str,
    ) -> Result<FinalizeOutcome, BookingError> {
        debug!(
            "Finalizing booking for session {} slot {} (intent {})",
            session_id, slot_index, payment_intent_id
        );

        let path = format!("/api/v1/sessions/{}/slots/{}/finalize", session_id, slot_index);
        let body = json!({ "payment_intent_id": payment_intent_id });

        self.client
            .request(Method::POST, &path, Some(auth_token), Some(body))
            .await
            .map_err(|e| BookingError::Backend(e.to_string()))
    }

    async fn attach_meeting(
        &self,
        session_id: Uuid,
        slot_index: usize,
        meeting_id: &str,
        auth_token: &str,
    ) -> Result<String, BookingError> {
        let path = format!("/api/v1/sessions/{}/slots/{}/meeting", session_id, slot_index);
        let body = json!({ "meeting_id": meeting_id });

        let response: AttachMeetingResponse = self
            .client
            .request(Method::POST, &path, Some(auth_token), Some(body))
            .await
            .map_err(|e| BookingError::Backend(e.to_string()))?;

        Ok(response.meeting_id)
    }
}
