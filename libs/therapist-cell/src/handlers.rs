// libs/therapist-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::error::AppError;
use shared_models::{parse_clinic_date, Gender};

use crate::models::RegistryError;
use crate::services::{ClinicRegistry, GenderMatchFilter};

/// Shared state for the roster routes.
#[derive(Debug, Clone)]
pub struct TherapistState {
    pub config: AppConfig,
    pub registry: Arc<ClinicRegistry>,
}

#[derive(Debug, Deserialize)]
pub struct TherapistListQuery {
    pub patient_gender: Option<String>,
    pub show_all: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub date: String,
}

impl From<RegistryError> for AppError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::RoomNotFound(_) | RegistryError::TherapistNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            RegistryError::DuplicateId { .. } => AppError::ValidationError(err.to_string()),
            RegistryError::Io(_) | RegistryError::Parse(_) => AppError::Internal(err.to_string()),
        }
    }
}

/// Therapist roster, narrowed by the clinic's gender-match policy when a
/// patient gender is supplied.
pub async fn list_therapists(
    State(state): State<Arc<TherapistState>>,
    Query(query): Query<TherapistListQuery>,
) -> Result<Json<Value>, AppError> {
    let patient_gender = query
        .patient_gender
        .as_deref()
        .map(str::parse::<Gender>)
        .transpose()?;
    let show_all = query.show_all.unwrap_or(false);

    let filter = GenderMatchFilter::from_config(&state.config);
    let therapists = filter.filter_for_patient(state.registry.therapists(), patient_gender, show_all);

    Ok(Json(json!({
        "therapists": therapists,
        "total": therapists.len(),
        "gender_filter_applied": filter.is_active(patient_gender, show_all),
    })))
}

pub async fn get_therapist_calendar(
    State(state): State<Arc<TherapistState>>,
    Path(therapist_id): Path<String>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<Value>, AppError> {
    let date = parse_clinic_date(&query.date)?;
    let therapist = state.registry.require_therapist(&therapist_id)?;

    Ok(Json(json!({
        "therapist_id": therapist.id,
        "date": date,
        "slots": therapist.available_slots(date),
    })))
}

pub async fn list_rooms(State(state): State<Arc<TherapistState>>) -> Json<Value> {
    Json(json!({
        "rooms": state.registry.rooms(),
        "total": state.registry.rooms().len(),
    }))
}
