// libs/schedule-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use axum_extra::TypedHeader;
use chrono::Utc;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::services::schedule::ScheduleService;

/// Evaluate a session's real-time availability against the server
/// clock. Re-derives from the latest backend snapshot on every call.
#[axum::debug_handler]
pub async fn get_session_availability(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let schedule_service = ScheduleService::new(&state);

    let availability = schedule_service
        .evaluate_availability(session_id, Utc::now(), token)
        .await
        .map_err(|e| {
            let msg = e.to_string();
            if msg.contains("Resource not found") {
                AppError::NotFound(format!("Session {} not found", session_id))
            } else {
                AppError::ExternalService(msg)
            }
        })?;

    let label = availability.label.to_string();

    Ok(Json(json!({
        "session_id": session_id,
        "availability": availability,
        "label": label,
    })))
}

/// Raw session snapshot passthrough for booking screens.
#[axum::debug_handler]
pub async fn get_session(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let schedule_service = ScheduleService::new(&state);

    let session = schedule_service
        .get_session(session_id, token)
        .await
        .map_err(|e| AppError::ExternalService(e.to_string()))?;

    Ok(Json(json!({ "session": session })))
}
