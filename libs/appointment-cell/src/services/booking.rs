// libs/appointment-cell/src/services/booking.rs
use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use patient_cell::PatientRegistry;
use shared_models::TimeSlot;
use therapist_cell::services::ClinicRegistry;

use crate::models::{
    AlternativeResult, Appointment, AppointmentError, AppointmentStatus, BookAppointmentRequest,
    BookingCandidate, DateRange, RecurringBookingRequest, RecurringBookingResponse, RecurringSlotRequest,
    RescheduleAppointmentRequest, RoomMatrix, SkippedDate,
};
use crate::repository::AppointmentRepository;
use crate::services::alternatives::{get_recurring_slot_alternatives, SchedulingContext};
use crate::services::conflict::{can_book_appointment, find_conflicts};
use crate::services::matrix::build_schedule_matrix;
use crate::services::timing::ClinicTimingTable;

/// Commit path around the pure scheduling core.
///
/// Every write re-runs the feasibility check on a fresh snapshot taken inside
/// the same call. Nothing stops two callers from passing that check against
/// the same snapshot; the store is last-write-wins.
pub struct AppointmentBookingService {
    repository: Arc<dyn AppointmentRepository>,
    registry: Arc<ClinicRegistry>,
    patients: Arc<PatientRegistry>,
    timing: Arc<ClinicTimingTable>,
}

impl AppointmentBookingService {
    pub fn new(
        repository: Arc<dyn AppointmentRepository>,
        registry: Arc<ClinicRegistry>,
        patients: Arc<PatientRegistry>,
        timing: Arc<ClinicTimingTable>,
    ) -> Self {
        Self {
            repository,
            registry,
            patients,
            timing,
        }
    }

    pub fn registry(&self) -> &ClinicRegistry {
        &self.registry
    }

    pub fn timing(&self) -> &ClinicTimingTable {
        &self.timing
    }

    // ==========================================================================
    // READ PATH
    // ==========================================================================

    pub fn schedule_matrix(&self, date: NaiveDate, now: NaiveDateTime) -> Result<Vec<RoomMatrix>, AppointmentError> {
        let appointments = self.repository.list_appointments(DateRange::single(date))?;

        Ok(build_schedule_matrix(
            date,
            &appointments,
            self.registry.rooms(),
            self.registry.therapists(),
            &self.timing,
            now,
        ))
    }

    pub fn check_feasibility(&self, candidate: &BookingCandidate) -> Result<bool, AppointmentError> {
        let appointments = self.repository.list_appointments(DateRange::single(candidate.date))?;
        Ok(can_book_appointment(candidate, &appointments))
    }

    #[instrument(skip(self, request), fields(patient_id = ?request.patient_id))]
    pub fn recurring_alternatives(
        &self,
        request: &RecurringSlotRequest,
        now: NaiveDateTime,
    ) -> Result<BTreeMap<NaiveDate, AlternativeResult>, AppointmentError> {
        let appointments = self.repository.list_appointments(self.recurring_range(request))?;
        let patient_gender = match request.patient_id.as_deref() {
            Some(patient_id) => {
                if self.patients.get(patient_id).is_none() {
                    warn!("Unknown patient {} in alternatives request, gender matching disabled", patient_id);
                }
                self.patients.gender_of(patient_id)
            }
            None => None,
        };

        let ctx = SchedulingContext {
            appointments: &appointments,
            rooms: self.registry.rooms(),
            therapists: self.registry.therapists(),
            timing: &self.timing,
            patient_gender,
            now,
        };

        Ok(get_recurring_slot_alternatives(request, &ctx))
    }

    pub fn list_appointments(&self, range: DateRange) -> Result<Vec<Appointment>, AppointmentError> {
        let mut appointments = self.repository.list_appointments(range)?;
        appointments.sort_by(|a, b| (a.date, a.slot, &a.room_id).cmp(&(b.date, b.slot, &b.room_id)));
        Ok(appointments)
    }

    pub fn get_appointment(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        self.repository
            .get(appointment_id)?
            .ok_or(AppointmentError::NotFound(appointment_id))
    }

    // ==========================================================================
    // COMMIT PATH
    // ==========================================================================

    #[instrument(skip(self, request), fields(date = %request.date, slot = %request.slot, room = %request.room_id))]
    pub fn book_appointment(
        &self,
        request: BookAppointmentRequest,
        now: NaiveDateTime,
    ) -> Result<Appointment, AppointmentError> {
        info!("Booking appointment for patient {} with therapists {:?}", request.client_id, request.therapist_ids);

        self.patients
            .require(&request.client_id)
            .map_err(|_| AppointmentError::PatientNotFound(request.client_id.clone()))?;
        self.validate_slot(&request.room_id, &request.therapist_ids, request.date, request.slot, now)?;

        let appointments = self.repository.list_appointments(DateRange::single(request.date))?;
        let candidate = BookingCandidate {
            therapist_ids: request.therapist_ids.clone(),
            room_number: request.room_id.clone(),
            date: request.date,
            slot: request.slot,
        };
        self.ensure_no_conflict(&candidate, &appointments)?;

        let appointment = Appointment {
            id: Uuid::new_v4(),
            date: request.date,
            slot: request.slot,
            room_id: request.room_id,
            therapist_ids: request.therapist_ids,
            client_id: request.client_id,
            duration_minutes: request.duration_minutes.unwrap_or(self.timing.slot_minutes()),
            tab: request.tab,
            status: AppointmentStatus::Scheduled,
        };
        self.repository.append(appointment.clone())?;

        info!("Appointment {} booked in room {} at {} on {}", appointment.id, appointment.room_id, appointment.slot, appointment.date);
        Ok(appointment)
    }

    /// Books every day of a recurring request that can be booked as asked.
    ///
    /// Days are independent: an infeasible or rejected day is reported in
    /// `skipped` together with its alternatives and does not stop the rest.
    #[instrument(skip(self, request), fields(start_date = %request.request.start_date))]
    pub fn book_recurring(
        &self,
        request: RecurringBookingRequest,
        now: NaiveDateTime,
    ) -> Result<RecurringBookingResponse, AppointmentError> {
        let client_id = request
            .request
            .patient_id
            .clone()
            .ok_or_else(|| AppointmentError::ValidationError("patient_id is required to book".to_string()))?;
        self.patients
            .require(&client_id)
            .map_err(|_| AppointmentError::PatientNotFound(client_id.clone()))?;

        let plan = self.recurring_alternatives(&request.request, now)?;
        let mut booked = Vec::new();
        let mut skipped = Vec::new();

        for (date, result) in plan {
            if !result.available {
                skipped.push(SkippedDate {
                    date,
                    reason: result.reason.map(|r| r.to_string()).unwrap_or_default(),
                    alternatives: result.alternatives,
                });
                continue;
            }

            let day = BookAppointmentRequest {
                date,
                slot: request.request.requested_slot,
                room_id: request.request.selected_room.clone(),
                therapist_ids: request.request.selected_therapists.clone(),
                client_id: client_id.clone(),
                duration_minutes: request.duration_minutes,
                tab: request.tab,
            };

            match self.book_appointment(day, now) {
                Ok(appointment) => booked.push(appointment),
                Err(err) => {
                    warn!("Skipping {} of recurring booking: {}", date, err);
                    skipped.push(SkippedDate {
                        date,
                        reason: err.to_string(),
                        alternatives: Vec::new(),
                    });
                }
            }
        }

        info!("Recurring booking for {}: {} booked, {} skipped", client_id, booked.len(), skipped.len());
        Ok(RecurringBookingResponse { booked, skipped })
    }

    #[instrument(skip(self, request))]
    pub fn reschedule_appointment(
        &self,
        appointment_id: Uuid,
        request: RescheduleAppointmentRequest,
        now: NaiveDateTime,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Rescheduling appointment: {}", appointment_id);

        let current = self.get_appointment(appointment_id)?;
        ensure_modifiable(&current)?;

        let date = request.date.unwrap_or(current.date);
        let slot = request.slot.unwrap_or(current.slot);
        let room_id = request.room_id.unwrap_or_else(|| current.room_id.clone());

        self.validate_slot(&room_id, &current.therapist_ids, date, slot, now)?;

        let others: Vec<Appointment> = self
            .repository
            .list_appointments(DateRange::single(date))?
            .into_iter()
            .filter(|a| a.id != appointment_id)
            .collect();
        let candidate = BookingCandidate {
            therapist_ids: current.therapist_ids.clone(),
            room_number: room_id.clone(),
            date,
            slot,
        };
        self.ensure_no_conflict(&candidate, &others)?;

        let rescheduled = Appointment {
            date,
            slot,
            room_id,
            ..current
        };
        self.repository.replace(rescheduled.clone())?;

        info!("Appointment {} moved to room {} at {} on {}", appointment_id, rescheduled.room_id, slot, date);
        Ok(rescheduled)
    }

    pub fn cancel_appointment(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        debug!("Cancelling appointment: {}", appointment_id);

        let current = self.get_appointment(appointment_id)?;
        ensure_modifiable(&current)?;

        let cancelled = Appointment {
            status: AppointmentStatus::Cancelled,
            ..current
        };
        self.repository.replace(cancelled.clone())?;

        info!("Appointment {} cancelled successfully", appointment_id);
        Ok(cancelled)
    }

    // ==========================================================================
    // VALIDATION HELPERS
    // ==========================================================================

    /// Everything about a (room, therapists, date, slot) request that does not
    /// depend on other bookings.
    fn validate_slot(
        &self,
        room_id: &str,
        therapist_ids: &[String],
        date: NaiveDate,
        slot: TimeSlot,
        now: NaiveDateTime,
    ) -> Result<(), AppointmentError> {
        if !self.timing.is_working_day(date) {
            return Err(AppointmentError::ClinicClosed(date));
        }
        if !self.timing.contains(date, slot) {
            return Err(AppointmentError::InvalidTime(format!("{} is not a clinic slot", slot)));
        }
        if therapist_ids.is_empty() {
            return Err(AppointmentError::NoTherapistsSelected);
        }

        self.registry
            .require_room(room_id)
            .map_err(|_| AppointmentError::RoomNotFound(room_id.to_string()))?;

        for therapist_id in therapist_ids {
            let therapist = self
                .registry
                .require_therapist(therapist_id)
                .map_err(|_| AppointmentError::TherapistNotFound(therapist_id.clone()))?;

            if !therapist.is_available_at(date, slot) {
                return Err(AppointmentError::TherapistNotAvailable {
                    therapist_id: therapist_id.clone(),
                    date,
                    slot,
                });
            }
        }

        if slot.is_past(date, now) {
            return Err(AppointmentError::SlotInPast { date, slot });
        }

        Ok(())
    }

    fn ensure_no_conflict(&self, candidate: &BookingCandidate, appointments: &[Appointment]) -> Result<(), AppointmentError> {
        let conflicts = find_conflicts(candidate, appointments);
        if conflicts.is_empty() {
            return Ok(());
        }

        warn!(
            "Booking conflict in room {} at {} on {}: {:?}",
            candidate.room_number,
            candidate.slot,
            candidate.date,
            conflicts.iter().map(|a| a.id).collect::<Vec<_>>()
        );
        Err(AppointmentError::ConflictDetected {
            date: candidate.date,
            slot: candidate.slot,
        })
    }

    fn recurring_range(&self, request: &RecurringSlotRequest) -> DateRange {
        let days = request.duration.resolve_days().max(1);
        let end = request
            .start_date
            .checked_add_days(chrono::Days::new(u64::from(days - 1)))
            .unwrap_or(NaiveDate::MAX);
        DateRange::new(request.start_date, end)
    }
}

fn ensure_modifiable(appointment: &Appointment) -> Result<(), AppointmentError> {
    match appointment.status {
        AppointmentStatus::Cancelled | AppointmentStatus::Completed => {
            warn!("Appointment {} cannot be modified in status {}", appointment.id, appointment.status);
            Err(AppointmentError::InvalidStatusTransition(appointment.status))
        }
        _ => Ok(()),
    }
}
