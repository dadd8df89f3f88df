//! # Appointment Cell
//!
//! The patient-facing appointment lifecycle: the booking
//! reconciliation client that converges a confirmed payment to a
//! backend-confirmed reservation, the join-window validator gating
//! entry into a realtime session, and the partition/sort/filter engine
//! behind the appointment history views.
//!
//! ```text
//! +---------------------------------------------------------+
//! |                   Appointment Cell                      |
//! +---------------------------------------------------------+
//! |  handlers.rs     |  HTTP endpoint handlers              |
//! |  router.rs       |  Route definitions                   |
//! |  models.rs       |  Appointment view, errors, policy    |
//! |  services/       |  Business logic layer                |
//! |    backend.rs    |  Marketplace backend contract + impl |
//! |    reconcile.rs  |  Payment->booking reconciliation     |
//! |    join_window.rs|  Join gating & meeting attachment    |
//! |    history.rs    |  Partition / sort / filter engine    |
//! +---------------------------------------------------------+
//! ```
//!
//! The backend owns slot state; every service here works from
//! snapshots and single mutating calls, holding no shared mutable
//! state between runs.

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{
    Appointment, AppointmentFilters, AppointmentHistory, BookingConfirmation, BookingError,
    CancellationToken, JoinDecision, JoinRejection, PaymentConfirmation, ReconcilePolicy,
};

pub use services::backend::{BookingBackend, FinalizeOutcome, HttpBookingBackend};
pub use services::history::{appointments_for_patient, partition_and_filter};
pub use services::join_window::{can_join, MeetingService, JOIN_WINDOW_LEAD_MINUTES};
pub use services::reconcile::BookingReconciliationService;

pub use router::appointment_routes;
