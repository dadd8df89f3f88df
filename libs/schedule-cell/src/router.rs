// libs/schedule-cell/src/router.rs
use std::sync::Arc;

use axum::{routing::get, Router};

use shared_config::AppConfig;

use crate::handlers;

pub fn schedule_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/{session_id}", get(handlers::get_session))
        .route("/{session_id}/availability", get(handlers::get_session_availability))
        .with_state(state)
}
