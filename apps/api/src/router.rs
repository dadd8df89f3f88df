use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use appointment_cell::router::appointment_routes;
use schedule_cell::router::schedule_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "CareSlot API is running!" }))
        .nest("/sessions", schedule_routes(state.clone()))
        .nest("/appointments", appointment_routes(state.clone()))
}
