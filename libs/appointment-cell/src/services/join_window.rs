// libs/appointment-cell/src/services/join_window.rs
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{Appointment, BookingError, JoinDecision, JoinRejection};
use crate::services::backend::BookingBackend;

/// How long before the scheduled start the join window opens.
pub const JOIN_WINDOW_LEAD_MINUTES: i64 = 5;

/// Gate entry into a realtime session: booked slots only, within
/// [start - 5min, end]. Both boundaries are inclusive. Pure; never
/// fails on well-formed input.
pub fn can_join(appointment: &Appointment, now: DateTime<Utc>) -> JoinDecision {
    if appointment.occupant_id.is_none() {
        return JoinDecision::Rejected(JoinRejection::NotBooked);
    }

    let window_opens =
        appointment.start_instant() - Duration::minutes(JOIN_WINDOW_LEAD_MINUTES);

    if now < window_opens {
        let remaining_ms = (window_opens - now).num_milliseconds();
        // Whole minutes until the window opens, ceiling-rounded.
        let minutes_until_window = (remaining_ms + 59_999) / 60_000;
        return JoinDecision::Rejected(JoinRejection::TooEarly {
            minutes_until_window,
        });
    }

    if now > appointment.end_instant() {
        return JoinDecision::Rejected(JoinRejection::Ended);
    }

    JoinDecision::Joinable
}

/// Lazily creates the realtime meeting for an appointment on first
/// join. The backend's echoed meeting id is always canonical: if two
/// clients race to attach one, the loser discards its local candidate
/// and adopts the echo.
pub struct MeetingService<B: BookingBackend> {
    backend: B,
}

impl<B: BookingBackend> MeetingService<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub async fn ensure_meeting(
        &self,
        appointment: &Appointment,
        auth_token: &str,
    ) -> Result<String, BookingError> {
        if let Some(existing) = &appointment.meeting_id {
            debug!(
                "Appointment already carries meeting {} for session {}",
                existing, appointment.session_id
            );
            return Ok(existing.clone());
        }

        let candidate = Uuid::new_v4().to_string();
        let canonical = self
            .backend
            .attach_meeting(
                appointment.session_id,
                appointment.slot_index,
                &candidate,
                auth_token,
            )
            .await?;

        if canonical != candidate {
            info!(
                "Another client attached a meeting first for session {}; adopting {}",
                appointment.session_id, canonical
            );
        }

        Ok(canonical)
    }
}
