//! # Schedule Cell
//!
//! Doctor session and time-slot data model plus the slot availability
//! evaluator. The evaluator is a pure function over a session snapshot
//! and a reference instant; the backend remains the source of truth
//! for slot state, so every evaluation re-derives from the latest
//! snapshot passed in.

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{
    AvailabilityLabel, HospitalRef, PaymentRef, SessionAvailability, SessionKind, SlotState,
    SlotStatus, Session, TimeSlot,
};

pub use services::availability::{
    classify_slot, evaluate_session, slot_end_instant, slot_start_instant,
};
pub use services::schedule::ScheduleService;

pub use router::schedule_routes;
