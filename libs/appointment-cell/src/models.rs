// libs/appointment-cell/src/models.rs
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use schedule_cell::models::{HospitalRef, PaymentRef, SessionKind};
use shared_config::AppConfig;

// ==============================================================================
// APPOINTMENT VIEW MODEL
// ==============================================================================

/// The pairing of one session and one of its slots for a specific
/// patient. Derived by scanning session snapshots; never persisted by
/// this cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub session_id: Uuid,
    pub slot_index: usize,
    pub kind: SessionKind,
    /// Session calendar date; any time-of-day component is spurious
    /// and ignored.
    pub date: DateTime<Utc>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub doctor_name: String,
    pub hospital: Option<HospitalRef>,
    pub occupant_id: Option<Uuid>,
    pub payment: Option<PaymentRef>,
    pub meeting_id: Option<String>,
}

impl Appointment {
    /// Absolute start instant: date part of `date` plus the slot's
    /// start time-of-day.
    pub fn start_instant(&self) -> DateTime<Utc> {
        self.date.date_naive().and_time(self.start_time).and_utc()
    }

    /// Absolute end instant.
    pub fn end_instant(&self) -> DateTime<Utc> {
        self.date.date_naive().and_time(self.end_time).and_utc()
    }

    pub fn calendar_date(&self) -> NaiveDate {
        self.date.date_naive()
    }

    /// A hospital-backed in-person appointment. Anything else counts
    /// as video for filtering purposes, so pre-tag records without a
    /// hospital reference keep classifying correctly.
    pub fn is_in_person(&self) -> bool {
        self.kind == SessionKind::InPerson && self.hospital.is_some()
    }
}

// ==============================================================================
// HISTORY FILTERS AND VIEWS
// ==============================================================================

/// Optional filters over a patient's appointments, AND-combined.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentFilters {
    pub doctor_name: Option<String>,
    pub hospital_name: Option<String>,
    pub kind: Option<SessionKind>,
    pub on_date: Option<NaiveDate>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
}

/// Temporally partitioned appointment views: upcoming soonest-first,
/// past most-recent-first.
#[derive(Debug, Clone, Serialize)]
pub struct AppointmentHistory {
    pub upcoming: Vec<Appointment>,
    pub past: Vec<Appointment>,
}

// ==============================================================================
// JOIN-WINDOW DECISIONS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinDecision {
    Joinable,
    Rejected(JoinRejection),
}

impl JoinDecision {
    pub fn is_joinable(&self) -> bool {
        matches!(self, JoinDecision::Joinable)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum JoinRejection {
    /// The slot has no occupant; nothing to join yet.
    NotBooked,
    /// The join window has not opened. Whole minutes remaining until
    /// it does, ceiling-rounded.
    TooEarly { minutes_until_window: i64 },
    /// The appointment's end instant has passed.
    Ended,
}

// ==============================================================================
// PAYMENT AND BOOKING RECONCILIATION
// ==============================================================================

/// Confirmation delivered by the payment processor after the user
/// completes payment entry. The processor protocol itself is opaque
/// to this cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    pub intent_id: String,
    pub amount_cents: i64,
    pub currency: String,
    pub paid_at: DateTime<Utc>,
}

/// Result of a successful reconciliation run.
#[derive(Debug, Clone, Serialize)]
pub struct BookingConfirmation {
    pub session: schedule_cell::models::Session,
    pub slot_index: usize,
    pub slot: schedule_cell::models::TimeSlot,
    pub attempts: u32,
}

/// Ephemeral record of one finalize attempt. Exists only for the
/// duration of a reconciliation run, for logging; never persisted.
#[derive(Debug, Clone)]
pub struct BookingAttempt {
    pub session_id: Uuid,
    pub slot_index: usize,
    pub payment_intent_id: String,
    pub attempt_number: u32,
}

/// Fixed-interval retry policy for booking reconciliation. No
/// exponential backoff: the settlement lag being absorbed is roughly
/// constant, not load-dependent.
#[derive(Debug, Clone)]
pub struct ReconcilePolicy {
    pub grace_delay: Duration,
    pub retry_interval: Duration,
    pub max_attempts: u32,
}

impl ReconcilePolicy {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            grace_delay: Duration::from_secs(config.reconcile_grace_delay_secs),
            retry_interval: Duration::from_secs(config.reconcile_retry_interval_secs),
            max_attempts: config.reconcile_max_attempts,
        }
    }
}

impl Default for ReconcilePolicy {
    fn default() -> Self {
        Self {
            grace_delay: Duration::from_secs(2),
            retry_interval: Duration::from_secs(3),
            max_attempts: 5,
        }
    }
}

/// Cooperative cancellation for an in-flight reconciliation run,
/// checked before each delay and before each network call. Cloning
/// shares the underlying flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum BookingError {
    #[error("Validation error: {0}")]
    Validation(String),

    /// The slot is occupied by a different reservation. Terminal;
    /// retrying can never succeed.
    #[error("Slot already taken by another reservation: {0}")]
    Conflict(String),

    /// The backend cannot serve the call right now. Safe to retry
    /// from the caller's side with a fresh reconciliation run.
    #[error("Booking backend temporarily unavailable: {0}")]
    TransientUnavailable(String),

    /// Attempts exhausted without success or conflict. The payment may
    /// have succeeded while the booking did not; requires manual
    /// reconciliation.
    #[error("Booking unresolved after {attempts} attempts; manual reconciliation required")]
    ReconciliationExhausted { attempts: u32 },

    #[error("Reconciliation cancelled")]
    Cancelled,

    #[error("Backend error: {0}")]
    Backend(String),
}
