use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use appointment_cell::handlers::SchedulingState;
use appointment_cell::router::{appointment_routes, schedule_routes};
use patient_cell::{create_patient_router, PatientRegistry};
use therapist_cell::handlers::TherapistState;
use therapist_cell::router::{room_routes, therapist_routes};

pub fn create_router(
    scheduling: Arc<SchedulingState>,
    roster: Arc<TherapistState>,
    patients: Arc<PatientRegistry>,
) -> Router {
    Router::new()
        .route("/", get(|| async { "Therapy Clinic API is running!" }))
        .nest("/schedule", schedule_routes(scheduling.clone()))
        .nest("/appointments", appointment_routes(scheduling))
        .nest("/therapists", therapist_routes(roster.clone()))
        .nest("/rooms", room_routes(roster))
        .nest("/patients", create_patient_router(patients))
}
