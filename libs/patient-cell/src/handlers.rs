use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use shared_models::error::AppError;

use crate::models::PatientError;
use crate::services::PatientRegistry;

impl From<PatientError> for AppError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::NotFound(_) => AppError::NotFound(err.to_string()),
            PatientError::DuplicateId(_) => AppError::ValidationError(err.to_string()),
        }
    }
}

pub async fn get_patient(
    State(registry): State<Arc<PatientRegistry>>,
    Path(patient_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let patient = registry.require(&patient_id)?;
    Ok(Json(json!(patient)))
}

pub async fn list_patients(State(registry): State<Arc<PatientRegistry>>) -> Json<Value> {
    Json(json!({
        "patients": registry.patients(),
        "total": registry.patients().len(),
    }))
}
