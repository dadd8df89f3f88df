// libs/schedule-cell/src/services/availability.rs
use chrono::{DateTime, Utc};

use crate::models::{
    AvailabilityLabel, SessionAvailability, SlotState, SlotStatus, Session, TimeSlot,
};

/// Absolute start instant of a slot: the session's calendar date
/// combined with the slot's own time-of-day. Any time-of-day carried
/// on the session date is discarded rather than trusted.
pub fn slot_start_instant(session_date: DateTime<Utc>, slot: &TimeSlot) -> DateTime<Utc> {
    session_date.date_naive().and_time(slot.start_time).and_utc()
}

/// Absolute end instant of a slot.
pub fn slot_end_instant(session_date: DateTime<Utc>, slot: &TimeSlot) -> DateTime<Utc> {
    session_date.date_naive().and_time(slot.end_time).and_utc()
}

/// Classify one slot against the reference instant, in priority order:
/// booked beats everything, then a same-day slot whose start has
/// already passed, then plain availability. Anything else (including
/// unknown persisted states) is unavailable.
pub fn classify_slot(session: &Session, slot: &TimeSlot, now: DateTime<Utc>) -> SlotState {
    match slot.status {
        SlotStatus::Booked => SlotState::Booked,
        SlotStatus::Available => {
            let is_today = session.date.date_naive() == now.date_naive();
            if is_today && slot_start_instant(session.date, slot) < now {
                SlotState::TimePassed
            } else {
                SlotState::Available
            }
        }
        SlotStatus::Unavailable => SlotState::Unavailable,
    }
}

/// Evaluate a full session snapshot. Pure and deterministic for a
/// given `now`; no I/O.
pub fn evaluate_session(session: &Session, now: DateTime<Utc>) -> SessionAvailability {
    let per_slot: Vec<SlotState> = session
        .slots
        .iter()
        .map(|slot| classify_slot(session, slot, now))
        .collect();

    let available = per_slot.iter().filter(|s| **s == SlotState::Available).count();
    let booked = per_slot.iter().filter(|s| **s == SlotState::Booked).count();
    let time_passed = per_slot.iter().filter(|s| **s == SlotState::TimePassed).count();
    let unavailable = per_slot.iter().filter(|s| **s == SlotState::Unavailable).count();

    let total = per_slot.len();
    let has_available = available > 0;

    let label = if has_available {
        AvailabilityLabel::BookAppointment
    } else if total > 0 && booked == total {
        AvailabilityLabel::FullyBooked
    } else if total > 0 && time_passed == total && booked == 0 {
        AvailabilityLabel::TimePassed
    } else {
        AvailabilityLabel::NoAvailableSlots
    };

    SessionAvailability {
        per_slot,
        available,
        booked,
        time_passed,
        unavailable,
        has_available,
        label,
    }
}
