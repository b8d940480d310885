// libs/appointment-cell/src/models.rs
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::{deserialize_clinic_date, deserialize_optional_clinic_date, ScheduleParseError, TimeSlot};

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

/// A booking held in the appointment store.
///
/// One appointment occupies exactly one room at one slot on one date, and
/// every listed therapist for that same slot. Source data names the slot
/// either `slot` or `time`; both collapse into `slot` here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub date: NaiveDate,
    #[serde(alias = "time")]
    pub slot: TimeSlot,
    #[serde(alias = "roomNumber", alias = "room_number")]
    pub room_id: String,
    #[serde(default, alias = "therapistIds")]
    pub therapist_ids: Vec<String>,
    #[serde(alias = "clientId", alias = "patient_id")]
    pub client_id: String,
    #[serde(default = "default_duration_minutes")]
    pub duration_minutes: u32,
    #[serde(default)]
    pub tab: AppointmentTab,
    #[serde(default)]
    pub status: AppointmentStatus,
}

fn default_duration_minutes() -> u32 {
    60
}

impl Appointment {
    /// Whether this booking holds its room and therapists at (date, slot).
    pub fn occupies(&self, date: NaiveDate, slot: TimeSlot) -> bool {
        self.status.occupies_slot() && self.date == date && self.slot == slot
    }

    pub fn occupies_room(&self, room_id: &str, date: NaiveDate, slot: TimeSlot) -> bool {
        self.occupies(date, slot) && self.room_id == room_id
    }

    pub fn involves_therapist(&self, therapist_id: &str) -> bool {
        self.therapist_ids.iter().any(|id| id == therapist_id)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppointmentTab {
    Doctor,
    #[default]
    Therapy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Confirmed,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    /// Cancelled bookings release their room and therapists.
    pub fn occupies_slot(&self) -> bool {
        !matches!(self, AppointmentStatus::Cancelled)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::NoShow => write!(f, "no_show"),
        }
    }
}

/// Inclusive date window used when reading from the appointment store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn single(date: NaiveDate) -> Self {
        Self { start: date, end: date }
    }

    pub fn unbounded() -> Self {
        Self {
            start: NaiveDate::MIN,
            end: NaiveDate::MAX,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

// ==============================================================================
// FEASIBILITY & MATRIX MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingCandidate {
    #[serde(alias = "therapistIds")]
    pub therapist_ids: Vec<String>,
    #[serde(alias = "roomNumber", alias = "room_id")]
    pub room_number: String,
    #[serde(deserialize_with = "deserialize_clinic_date")]
    pub date: NaiveDate,
    #[serde(alias = "time")]
    pub slot: TimeSlot,
}

/// One room at one slot of the schedule grid. Derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixCell {
    pub slot: TimeSlot,
    pub is_past: bool,
    pub is_booked: bool,
    pub is_room_available: bool,
    pub available_therapists: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking: Option<Appointment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomMatrix {
    pub room_id: String,
    pub room_name: String,
    pub cells: Vec<MatrixCell>,
}

impl RoomMatrix {
    pub fn cell(&self, slot: TimeSlot) -> Option<&MatrixCell> {
        self.cells.iter().find(|c| c.slot == slot)
    }
}

// ==============================================================================
// RECURRING REQUEST & ALTERNATIVE MODELS
// ==============================================================================

/// How many consecutive days a recurring request spans.
///
/// Presets mirror the wizard's fixed choices; anything else arrives as a
/// custom day count. This is never a number of minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "days", rename_all = "snake_case")]
pub enum BookingDuration {
    Preset(u32),
    Custom(i64),
}

impl BookingDuration {
    pub const PRESET_DAYS: [u32; 5] = [1, 3, 7, 14, 21];
    pub const MAX_CUSTOM_DAYS: u32 = 366;

    /// Resolved day count; zero for an unknown preset or a non-positive custom
    /// value. Custom counts are capped at one year.
    pub fn resolve_days(&self) -> u32 {
        match *self {
            BookingDuration::Preset(days) if Self::PRESET_DAYS.contains(&days) => days,
            BookingDuration::Preset(_) => 0,
            BookingDuration::Custom(days) if days > 0 => {
                u32::try_from(days).unwrap_or(u32::MAX).min(Self::MAX_CUSTOM_DAYS)
            }
            BookingDuration::Custom(_) => 0,
        }
    }
}

impl Default for BookingDuration {
    fn default() -> Self {
        BookingDuration::Preset(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringSlotRequest {
    #[serde(deserialize_with = "deserialize_clinic_date")]
    pub start_date: NaiveDate,
    #[serde(default)]
    pub duration: BookingDuration,
    #[serde(alias = "slot", alias = "time")]
    pub requested_slot: TimeSlot,
    pub selected_therapists: Vec<String>,
    #[serde(alias = "roomNumber")]
    pub selected_room: String,
    #[serde(default)]
    pub patient_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnavailableReason {
    #[serde(rename = "Time Slot is in the past")]
    SlotInPast,
    #[serde(rename = "Therapists are busy")]
    TherapistsBusy,
    #[serde(rename = "Selected Room is not available")]
    RoomUnavailable,
    #[serde(rename = "Clinic is closed on this day")]
    ClinicClosed,
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            UnavailableReason::SlotInPast => "Time Slot is in the past",
            UnavailableReason::TherapistsBusy => "Therapists are busy",
            UnavailableReason::RoomUnavailable => "Selected Room is not available",
            UnavailableReason::ClinicClosed => "Clinic is closed on this day",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternativeSlot {
    pub slot: TimeSlot,
    #[serde(rename = "roomNumber", alias = "room_number")]
    pub room_number: String,
}

impl AlternativeSlot {
    pub fn new(slot: TimeSlot, room_number: &str) -> Self {
        Self {
            slot,
            room_number: room_number.to_string(),
        }
    }
}

/// Outcome of one day of a recurring request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternativeResult {
    pub available: bool,
    pub reason: Option<UnavailableReason>,
    pub alternatives: Vec<AlternativeSlot>,
}

impl AlternativeResult {
    pub fn available() -> Self {
        Self {
            available: true,
            reason: None,
            alternatives: Vec::new(),
        }
    }

    pub fn unavailable(reason: UnavailableReason, alternatives: Vec<AlternativeSlot>) -> Self {
        Self {
            available: false,
            reason: Some(reason),
            alternatives,
        }
    }
}

// ==============================================================================
// BOOKING COMMIT MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    #[serde(deserialize_with = "deserialize_clinic_date")]
    pub date: NaiveDate,
    #[serde(alias = "time")]
    pub slot: TimeSlot,
    #[serde(alias = "roomNumber", alias = "room_number")]
    pub room_id: String,
    #[serde(alias = "therapistIds")]
    pub therapist_ids: Vec<String>,
    #[serde(alias = "clientId", alias = "patient_id")]
    pub client_id: String,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub tab: AppointmentTab,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringBookingRequest {
    #[serde(flatten)]
    pub request: RecurringSlotRequest,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub tab: AppointmentTab,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedDate {
    pub date: NaiveDate,
    pub reason: String,
    pub alternatives: Vec<AlternativeSlot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringBookingResponse {
    pub booked: Vec<Appointment>,
    pub skipped: Vec<SkippedDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RescheduleAppointmentRequest {
    #[serde(default, deserialize_with = "deserialize_optional_clinic_date")]
    pub date: Option<NaiveDate>,
    #[serde(default, alias = "time")]
    pub slot: Option<TimeSlot>,
    #[serde(default, alias = "roomNumber", alias = "room_number")]
    pub room_id: Option<String>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found: {0}")]
    NotFound(Uuid),

    #[error("Room not found: {0}")]
    RoomNotFound(String),

    #[error("Therapist not found: {0}")]
    TherapistNotFound(String),

    #[error("Patient not found: {0}")]
    PatientNotFound(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid appointment time: {0}")]
    InvalidTime(String),

    #[error("At least one therapist must be selected")]
    NoTherapistsSelected,

    #[error("Clinic is closed on {0}")]
    ClinicClosed(NaiveDate),

    #[error("Time slot {slot} on {date} is in the past")]
    SlotInPast { date: NaiveDate, slot: TimeSlot },

    #[error("Therapist {therapist_id} does not work at {slot} on {date}")]
    TherapistNotAvailable {
        therapist_id: String,
        date: NaiveDate,
        slot: TimeSlot,
    },

    #[error("Appointment conflicts with existing booking at {slot} on {date}")]
    ConflictDetected { date: NaiveDate, slot: TimeSlot },

    #[error("Appointment {0} already exists")]
    DuplicateAppointment(Uuid),

    #[error("Appointment cannot be modified in current status: {0}")]
    InvalidStatusTransition(AppointmentStatus),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}

impl From<ScheduleParseError> for AppointmentError {
    fn from(err: ScheduleParseError) -> Self {
        match err {
            ScheduleParseError::InvalidDate(value) => AppointmentError::InvalidDate(value),
            ScheduleParseError::InvalidSlot(value) => AppointmentError::InvalidTime(value),
            other => AppointmentError::ValidationError(other.to_string()),
        }
    }
}
