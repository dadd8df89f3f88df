// libs/schedule-cell/src/services/schedule.rs
use anyhow::Result;
use chrono::{DateTime, Utc};
use reqwest::Method;
use tracing::debug;
use uuid::Uuid;

use shared_backend::MarketplaceClient;
use shared_config::AppConfig;

use crate::models::{Session, SessionAvailability};
use crate::services::availability::evaluate_session;

/// Fetches session snapshots from the marketplace backend and runs
/// the availability evaluator over them. Holds no slot state of its
/// own.
pub struct ScheduleService {
    client: MarketplaceClient,
}

impl ScheduleService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: MarketplaceClient::new(config),
        }
    }

    /// Current snapshot of a session, including occupant and payment
    /// fields when the caller is authorized.
    pub async fn get_session(&self, session_id: Uuid, auth_token: &str) -> Result<Session> {
        debug!("Fetching session snapshot: {}", session_id);

        let path = format!("/api/v1/sessions/{}", session_id);
        let session: Session = self
            .client
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        Ok(session)
    }

    /// Fetch the latest snapshot and evaluate it against `now`.
    pub async fn evaluate_availability(
        &self,
        session_id: Uuid,
        now: DateTime<Utc>,
        auth_token: &str,
    ) -> Result<SessionAvailability> {
        let session = self.get_session(session_id, auth_token).await?;
        Ok(evaluate_session(&session, now))
    }
}
