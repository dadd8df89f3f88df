// libs/appointment-cell/src/services/history.rs
use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Method;
use tracing::debug;
use uuid::Uuid;

use schedule_cell::models::{Session, SessionKind};
use shared_backend::MarketplaceClient;
use shared_config::AppConfig;

use crate::models::{Appointment, AppointmentFilters, AppointmentHistory};

/// Reconstruct a patient's appointments from session snapshots: every
/// slot whose occupant is the patient becomes one appointment view.
pub fn appointments_for_patient(sessions: &[Session], patient_id: Uuid) -> Vec<Appointment> {
    sessions
        .iter()
        .flat_map(|session| {
            session
                .slots
                .iter()
                .enumerate()
                .filter(move |(_, slot)| slot.occupant_id == Some(patient_id))
                .map(move |(slot_index, slot)| Appointment {
                    session_id: session.id,
                    slot_index,
                    kind: session.kind,
                    date: session.date,
                    start_time: slot.start_time,
                    end_time: slot.end_time,
                    doctor_name: session.doctor_name.clone(),
                    hospital: session.hospital.clone(),
                    occupant_id: slot.occupant_id,
                    payment: slot.payment.clone(),
                    meeting_id: slot.meeting_id.clone(),
                })
        })
        .collect()
}

/// Partition a patient's appointments into upcoming and past views,
/// filter, and order them. Pure; filtering and sorting commute, so
/// the filter is applied first only as a matter of doing less work.
///
/// An appointment whose end instant equals `now` exactly is past, not
/// upcoming.
pub fn partition_and_filter(
    appointments: Vec<Appointment>,
    now: DateTime<Utc>,
    filters: &AppointmentFilters,
) -> AppointmentHistory {
    let (mut upcoming, mut past): (Vec<Appointment>, Vec<Appointment>) = appointments
        .into_iter()
        .filter(|appointment| matches_filters(appointment, filters))
        .partition(|appointment| appointment.end_instant() > now);

    upcoming.sort_by_key(|a| a.start_instant());
    past.sort_by(|a, b| b.end_instant().cmp(&a.end_instant()));

    AppointmentHistory { upcoming, past }
}

fn matches_filters(appointment: &Appointment, filters: &AppointmentFilters) -> bool {
    if let Some(ref needle) = filters.doctor_name {
        if !contains_ignore_case(&appointment.doctor_name, needle) {
            return false;
        }
    }

    if let Some(ref needle) = filters.hospital_name {
        // Only meaningful for in-person appointments; a video
        // appointment never matches a hospital filter.
        match &appointment.hospital {
            Some(hospital) if appointment.is_in_person() => {
                if !contains_ignore_case(&hospital.name, needle) {
                    return false;
                }
            }
            _ => return false,
        }
    }

    if let Some(kind) = filters.kind {
        let in_person = appointment.is_in_person();
        match kind {
            SessionKind::InPerson if !in_person => return false,
            SessionKind::Video if in_person => return false,
            _ => {}
        }
    }

    if let Some(on_date) = filters.on_date {
        if appointment.calendar_date() != on_date {
            return false;
        }
    }

    if !within_date_range(
        appointment.calendar_date(),
        filters.from_date,
        filters.to_date,
    ) {
        return false;
    }

    true
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Range check with the appointment date normalized to noon and the
/// bounds widened to the whole calendar day, so boundary rounding can
/// never exclude a day that belongs in the range.
fn within_date_range(date: NaiveDate, from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool {
    let noon = date.and_hms_opt(12, 0, 0).expect("noon is a valid time");

    if let Some(from) = from {
        let range_start = from.and_hms_opt(0, 0, 0).expect("midnight is a valid time");
        if noon < range_start {
            return false;
        }
    }

    if let Some(to) = to {
        let range_end = to
            .and_hms_milli_opt(23, 59, 59, 999)
            .expect("end of day is a valid time");
        if noon > range_end {
            return false;
        }
    }

    true
}

/// Fetches the sessions a patient occupies a slot in and derives the
/// partitioned history views from them.
pub struct HistoryService {
    client: MarketplaceClient,
}

impl HistoryService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: MarketplaceClient::new(config),
        }
    }

    /// All sessions containing a slot occupied by the patient.
    pub async fn get_booked_sessions(
        &self,
        patient_id: Uuid,
        auth_token: &str,
    ) -> Result<Vec<Session>> {
        debug!("Fetching booked sessions for patient {}", patient_id);

        let path = format!("/api/v1/patients/{}/sessions", patient_id);
        let sessions: Vec<Session> = self
            .client
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        Ok(sessions)
    }

    pub async fn get_history(
        &self,
        patient_id: Uuid,
        now: DateTime<Utc>,
        filters: &AppointmentFilters,
        auth_token: &str,
    ) -> Result<AppointmentHistory> {
        let sessions = self.get_booked_sessions(patient_id, auth_token).await?;
        let appointments = appointments_for_patient(&sessions, patient_id);
        Ok(partition_and_filter(appointments, now, filters))
    }
}
