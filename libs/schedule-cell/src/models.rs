// libs/schedule-cell/src/models.rs
use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A doctor-defined block of bookable time on a calendar date.
///
/// `date` may arrive from the wire with a spurious time-of-day
/// component; only the date part is authoritative. Slot instants are
/// always rebuilt from `date.date_naive()` plus the slot's own
/// time-of-day fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub doctor_name: String,
    pub date: DateTime<Utc>,
    pub kind: SessionKind,
    pub hospital: Option<HospitalRef>,
    pub slots: Vec<TimeSlot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    InPerson,
    Video,
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionKind::InPerson => write!(f, "in_person"),
            SessionKind::Video => write!(f, "video"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HospitalRef {
    pub id: Uuid,
    pub name: String,
}

/// One bookable interval within a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: SlotStatus,
    pub occupant_id: Option<Uuid>,
    pub payment: Option<PaymentRef>,
    pub meeting_id: Option<String>,
}

/// Persisted slot state. Unknown wire values deserialize to
/// `Unavailable`, never to `Available`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Available,
    Booked,
    #[serde(other)]
    Unavailable,
}

/// Payment association recorded on a slot once the processor has
/// confirmed payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRef {
    pub intent_id: String,
    pub amount_cents: i64,
    pub currency: String,
    pub paid_at: DateTime<Utc>,
}

/// Real-time classification of a single slot against a reference
/// instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotState {
    Available,
    Booked,
    TimePassed,
    Unavailable,
}

/// Aggregate availability for a session at a reference instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionAvailability {
    pub per_slot: Vec<SlotState>,
    pub available: usize,
    pub booked: usize,
    pub time_passed: usize,
    pub unavailable: usize,
    pub has_available: bool,
    pub label: AvailabilityLabel,
}

/// User-facing availability label for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityLabel {
    BookAppointment,
    FullyBooked,
    TimePassed,
    NoAvailableSlots,
}

impl fmt::Display for AvailabilityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AvailabilityLabel::BookAppointment => write!(f, "Book Appointment"),
            AvailabilityLabel::FullyBooked => write!(f, "Fully Booked"),
            AvailabilityLabel::TimePassed => write!(f, "Time Passed"),
            AvailabilityLabel::NoAvailableSlots => write!(f, "No Available Slots"),
        }
    }
}
