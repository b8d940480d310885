use std::sync::Arc;

use axum::{routing::get, Router};

use crate::handlers::*;
use crate::services::PatientRegistry;

pub fn create_patient_router(registry: Arc<PatientRegistry>) -> Router {
    Router::new()
        .route("/", get(list_patients))
        .route("/{id}", get(get_patient))
        .with_state(registry)
}
