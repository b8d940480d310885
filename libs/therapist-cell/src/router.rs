// libs/therapist-cell/src/router.rs
use std::sync::Arc;

use axum::{routing::get, Router};

use crate::handlers::{self, TherapistState};

pub fn therapist_routes(state: Arc<TherapistState>) -> Router {
    Router::new()
        .route("/", get(handlers::list_therapists))
        .route("/{therapist_id}/calendar", get(handlers::get_therapist_calendar))
        .with_state(state)
}

pub fn room_routes(state: Arc<TherapistState>) -> Router {
    Router::new()
        .route("/", get(handlers::list_rooms))
        .with_state(state)
}
