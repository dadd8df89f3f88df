// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;

use crate::handlers;

pub fn appointment_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/reconcile", post(handlers::reconcile_booking))
        .route("/history", get(handlers::get_appointment_history))
        .route("/join", post(handlers::join_appointment))
        .with_state(state)
}
