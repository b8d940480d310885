// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{Local, NaiveDateTime};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;
use shared_models::parse_clinic_date;

use crate::models::{
    AppointmentError, BookAppointmentRequest, BookingCandidate, DateRange, RecurringBookingRequest,
    RecurringSlotRequest, RescheduleAppointmentRequest,
};
use crate::services::booking::AppointmentBookingService;

/// Shared state for the schedule and appointment routes.
pub struct SchedulingState {
    pub booking: AppointmentBookingService,
}

// ==============================================================================
// QUERY PARAMETER STRUCTS
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct MatrixQuery {
    pub date: String,
}

#[derive(Debug, Deserialize)]
pub struct AppointmentListQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::NotFound(_)
            | AppointmentError::RoomNotFound(_)
            | AppointmentError::TherapistNotFound(_)
            | AppointmentError::PatientNotFound(_) => AppError::NotFound(err.to_string()),
            AppointmentError::InvalidDate(_)
            | AppointmentError::InvalidTime(_)
            | AppointmentError::NoTherapistsSelected
            | AppointmentError::ValidationError(_) => AppError::BadRequest(err.to_string()),
            AppointmentError::ClinicClosed(_)
            | AppointmentError::SlotInPast { .. }
            | AppointmentError::TherapistNotAvailable { .. } => AppError::ValidationError(err.to_string()),
            AppointmentError::ConflictDetected { .. }
            | AppointmentError::DuplicateAppointment(_)
            | AppointmentError::InvalidStatusTransition(_) => AppError::Conflict(err.to_string()),
            AppointmentError::StorageError(_) => AppError::Internal(err.to_string()),
        }
    }
}

/// Wall-clock "now". The scheduling core never reads the clock itself.
fn clinic_now() -> NaiveDateTime {
    Local::now().naive_local()
}

// ==============================================================================
// SCHEDULE HANDLERS
// ==============================================================================

pub async fn get_schedule_matrix(
    State(state): State<Arc<SchedulingState>>,
    Query(query): Query<MatrixQuery>,
) -> Result<Json<Value>, AppError> {
    let date = parse_clinic_date(&query.date)?;
    let matrix = state.booking.schedule_matrix(date, clinic_now())?;

    Ok(Json(json!({
        "date": date,
        "rooms": matrix,
    })))
}

pub async fn check_can_book(
    State(state): State<Arc<SchedulingState>>,
    Json(candidate): Json<BookingCandidate>,
) -> Result<Json<Value>, AppError> {
    let can_book = state.booking.check_feasibility(&candidate)?;

    Ok(Json(json!({
        "can_book": can_book,
    })))
}

pub async fn get_recurring_alternatives(
    State(state): State<Arc<SchedulingState>>,
    Json(request): Json<RecurringSlotRequest>,
) -> Result<Json<Value>, AppError> {
    let results = state.booking.recurring_alternatives(&request, clinic_now())?;

    Ok(Json(json!({
        "days": results.len(),
        "results": results,
    })))
}

// ==============================================================================
// APPOINTMENT HANDLERS
// ==============================================================================

pub async fn list_appointments(
    State(state): State<Arc<SchedulingState>>,
    Query(query): Query<AppointmentListQuery>,
) -> Result<Json<Value>, AppError> {
    let from = query.from.as_deref().map(parse_clinic_date).transpose()?;
    let to = query.to.as_deref().map(parse_clinic_date).transpose()?;
    let unbounded = DateRange::unbounded();
    let range = DateRange::new(from.unwrap_or(unbounded.start), to.unwrap_or(unbounded.end));

    let appointments = state.booking.list_appointments(range)?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len(),
    })))
}

pub async fn get_appointment(
    State(state): State<Arc<SchedulingState>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let appointment = state.booking.get_appointment(appointment_id)?;
    Ok(Json(json!(appointment)))
}

pub async fn book_appointment(
    State(state): State<Arc<SchedulingState>>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = state.booking.book_appointment(request, clinic_now())?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
    })))
}

pub async fn book_recurring(
    State(state): State<Arc<SchedulingState>>,
    Json(request): Json<RecurringBookingRequest>,
) -> Result<Json<Value>, AppError> {
    let response = state.booking.book_recurring(request, clinic_now())?;
    Ok(Json(json!(response)))
}

pub async fn reschedule_appointment(
    State(state): State<Arc<SchedulingState>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<RescheduleAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = state
        .booking
        .reschedule_appointment(appointment_id, request, clinic_now())?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
    })))
}

pub async fn cancel_appointment(
    State(state): State<Arc<SchedulingState>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let appointment = state.booking.cancel_appointment(appointment_id)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
    })))
}
