// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use axum_extra::TypedHeader;
use chrono::{NaiveDate, Utc};
use headers::{authorization::Bearer, Authorization};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use schedule_cell::models::SessionKind;
use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{
    Appointment, AppointmentFilters, BookingError, CancellationToken, PaymentConfirmation,
    ReconcilePolicy,
};
use crate::services::backend::{BookingBackend, HttpBookingBackend};
use crate::services::history::HistoryService;
use crate::services::join_window::{can_join, MeetingService};
use crate::services::reconcile::BookingReconciliationService;

// ==============================================================================
// REQUEST/QUERY STRUCTS
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct ReconcileBookingRequest {
    pub session_id: Uuid,
    pub slot_index: usize,
    pub payment: PaymentConfirmation,
}

#[derive(Debug, Deserialize)]
pub struct JoinAppointmentRequest {
    pub session_id: Uuid,
    pub slot_index: usize,
    pub patient_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQueryParams {
    pub patient_id: Uuid,
    pub doctor_name: Option<String>,
    pub hospital_name: Option<String>,
    pub kind: Option<SessionKind>,
    pub on_date: Option<NaiveDate>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
}

// ==============================================================================
// HANDLERS
// ==============================================================================

/// Finalize a paid-for slot against the backend. May take seconds to
/// minutes depending on how many retries the settlement lag costs.
#[axum::debug_handler]
pub async fn reconcile_booking(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<ReconcileBookingRequest>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    let backend = HttpBookingBackend::new(&state);
    let policy = ReconcilePolicy::from_config(&state);
    let service = BookingReconciliationService::new(backend, policy);

    // The HTTP surface has no cancellation path; callers embedding the
    // service directly thread their own token.
    let cancel = CancellationToken::new();

    let confirmation = service
        .reconcile(
            request.session_id,
            request.slot_index,
            &request.payment,
            &cancel,
            token,
        )
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({ "booking": confirmation })))
}

/// A patient's appointment history, partitioned into upcoming and
/// past views with the optional filters AND-combined.
#[axum::debug_handler]
pub async fn get_appointment_history(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Query(params): Query<HistoryQueryParams>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    let filters = AppointmentFilters {
        doctor_name: params.doctor_name,
        hospital_name: params.hospital_name,
        kind: params.kind,
        on_date: params.on_date,
        from_date: params.from_date,
        to_date: params.to_date,
    };

    let history_service = HistoryService::new(&state);
    let history = history_service
        .get_history(params.patient_id, Utc::now(), &filters, token)
        .await
        .map_err(|e| AppError::ExternalService(e.to_string()))?;

    Ok(Json(json!({ "history": history })))
}

/// Gate entry into the realtime session for a booked appointment and
/// lazily attach the meeting on first successful join.
#[axum::debug_handler]
pub async fn join_appointment(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<JoinAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    let backend = HttpBookingBackend::new(&state);
    let session = backend
        .get_session(request.session_id, token)
        .await
        .map_err(map_booking_error)?;

    let slot = session.slots.get(request.slot_index).ok_or_else(|| {
        AppError::ValidationError(format!(
            "slot index {} out of range for session {}",
            request.slot_index, request.session_id
        ))
    })?;

    if slot.occupant_id != Some(request.patient_id) {
        return Err(AppError::ValidationError(
            "appointment is not booked for this patient".to_string(),
        ));
    }

    let appointment = Appointment {
        session_id: session.id,
        slot_index: request.slot_index,
        kind: session.kind,
        date: session.date,
        start_time: slot.start_time,
        end_time: slot.end_time,
        doctor_name: session.doctor_name.clone(),
        hospital: session.hospital.clone(),
        occupant_id: slot.occupant_id,
        payment: slot.payment.clone(),
        meeting_id: slot.meeting_id.clone(),
    };

    let decision = can_join(&appointment, Utc::now());
    if !decision.is_joinable() {
        return Ok(Json(json!({
            "joinable": false,
            "decision": decision,
        })));
    }

    let meeting_service = MeetingService::new(backend);
    let meeting_id = meeting_service
        .ensure_meeting(&appointment, token)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "joinable": true,
        "meeting_id": meeting_id,
    })))
}

fn map_booking_error(e: BookingError) -> AppError {
    match e {
        BookingError::Validation(msg) => AppError::ValidationError(msg),
        BookingError::Conflict(msg) => {
            // Surfaced distinctly so the UI can explain "someone else
            // booked this slot" rather than "try again".
            AppError::Conflict(format!("Slot already taken by another reservation: {}", msg))
        }
        BookingError::ReconciliationExhausted { attempts } => AppError::BookingUnresolved(format!(
            "booking unresolved after {} attempts; contact support to reconcile the payment",
            attempts
        )),
        BookingError::Cancelled => AppError::BadRequest("reconciliation cancelled".to_string()),
        BookingError::TransientUnavailable(msg) | BookingError::Backend(msg) => {
            AppError::ExternalService(msg)
        }
    }
}
