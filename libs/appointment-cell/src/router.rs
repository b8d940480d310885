// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::handlers::{self, SchedulingState};

pub fn schedule_routes(state: Arc<SchedulingState>) -> Router {
    Router::new()
        .route("/matrix", get(handlers::get_schedule_matrix))
        .route("/can-book", post(handlers::check_can_book))
        .route("/alternatives", post(handlers::get_recurring_alternatives))
        .with_state(state)
}

pub fn appointment_routes(state: Arc<SchedulingState>) -> Router {
    Router::new()
        .route("/", get(handlers::list_appointments).post(handlers::book_appointment))
        .route("/recurring", post(handlers::book_recurring))
        .route("/{appointment_id}", get(handlers::get_appointment))
        .route("/{appointment_id}/reschedule", patch(handlers::reschedule_appointment))
        .route("/{appointment_id}/cancel", post(handlers::cancel_appointment))
        .with_state(state)
}
