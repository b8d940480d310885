// libs/appointment-cell/src/repository.rs
use std::sync::RwLock;

use tracing::debug;
use uuid::Uuid;

use crate::models::{Appointment, AppointmentError, DateRange};

/// The appointment store the scheduling engine reads from.
///
/// The engine only ever lists a snapshot and appends; there is no locking or
/// versioning between a feasibility check and the write that follows it.
pub trait AppointmentRepository: Send + Sync {
    fn list_appointments(&self, range: DateRange) -> Result<Vec<Appointment>, AppointmentError>;

    fn append(&self, appointment: Appointment) -> Result<(), AppointmentError>;

    fn get(&self, id: Uuid) -> Result<Option<Appointment>, AppointmentError>;

    /// Overwrite the stored appointment with the same id (last write wins).
    fn replace(&self, appointment: Appointment) -> Result<(), AppointmentError>;
}

#[derive(Debug, Default)]
pub struct InMemoryAppointmentRepository {
    appointments: RwLock<Vec<Appointment>>,
}

impl InMemoryAppointmentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_appointments(appointments: Vec<Appointment>) -> Self {
        Self {
            appointments: RwLock::new(appointments),
        }
    }
}

fn poisoned<T>(_: T) -> AppointmentError {
    AppointmentError::StorageError("appointment store lock poisoned".to_string())
}

impl AppointmentRepository for InMemoryAppointmentRepository {
    fn list_appointments(&self, range: DateRange) -> Result<Vec<Appointment>, AppointmentError> {
        let guard = self.appointments.read().map_err(poisoned)?;
        Ok(guard
            .iter()
            .filter(|a| range.contains(a.date))
            .cloned()
            .collect())
    }

    fn append(&self, appointment: Appointment) -> Result<(), AppointmentError> {
        let mut guard = self.appointments.write().map_err(poisoned)?;
        if guard.iter().any(|a| a.id == appointment.id) {
            return Err(AppointmentError::DuplicateAppointment(appointment.id));
        }

        debug!("Appending appointment {} on {} at {}", appointment.id, appointment.date, appointment.slot);
        guard.push(appointment);
        Ok(())
    }

    fn get(&self, id: Uuid) -> Result<Option<Appointment>, AppointmentError> {
        let guard = self.appointments.read().map_err(poisoned)?;
        Ok(guard.iter().find(|a| a.id == id).cloned())
    }

    fn replace(&self, appointment: Appointment) -> Result<(), AppointmentError> {
        let mut guard = self.appointments.write().map_err(poisoned)?;
        let existing = guard
            .iter_mut()
            .find(|a| a.id == appointment.id)
            .ok_or(AppointmentError::NotFound(appointment.id))?;
        *existing = appointment;
        Ok(())
    }
}
