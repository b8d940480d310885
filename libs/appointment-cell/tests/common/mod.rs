// Shared fixtures for the appointment-cell integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use uuid::Uuid;

use appointment_cell::{
    Appointment, AppointmentBookingService, AppointmentStatus, AppointmentTab, BookingDuration, ClinicTimingTable,
    InMemoryAppointmentRepository, RecurringSlotRequest, SchedulingContext,
};
use patient_cell::{Patient, PatientRegistry};
use shared_models::{Gender, TimeSlot};
use therapist_cell::{ClinicRegistry, Room, Therapist};

/// Tuesday.
pub fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, 20).unwrap()
}

pub fn slot(s: &str) -> TimeSlot {
    TimeSlot::parse(s).unwrap()
}

pub fn at(date: NaiveDate, hm: &str) -> NaiveDateTime {
    date.and_time(slot(hm).time())
}

/// A moment well before every fixture date.
pub fn long_ago() -> NaiveDateTime {
    at(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), "00:00")
}

/// First Tuesday at least a week from today, for tests that go through the
/// wall clock.
pub fn upcoming_tuesday() -> NaiveDate {
    let mut date = chrono::Local::now().date_naive() + Duration::days(7);
    while date.weekday() != Weekday::Tue {
        date = date.succ_opt().unwrap();
    }
    date
}

/// Rooms r1-r3; t1/t3 female, t2/t4 male, every therapist working every
/// clinic slot for `days` dates from `start`.
pub fn registry_from(start: NaiveDate, days: i64) -> ClinicRegistry {
    let timing = ClinicTimingTable::default();
    let rooms = vec![
        Room::new("r1", "Room 1"),
        Room::new("r2", "Room 2"),
        Room::new("r3", "Room 3"),
    ];
    let mut therapists = vec![
        Therapist::new("t1", "Aisha", Gender::Female),
        Therapist::new("t2", "Omar", Gender::Male),
        Therapist::new("t3", "Sara", Gender::Female),
        Therapist::new("t4", "Bilal", Gender::Male),
    ];
    for offset in 0..days {
        let date = start + Duration::days(offset);
        therapists = therapists
            .into_iter()
            .map(|t| t.with_availability(date, timing.all_slots().iter().copied()))
            .collect();
    }
    ClinicRegistry::new(rooms, therapists).unwrap()
}

pub fn registry() -> ClinicRegistry {
    registry_from(day(), 7)
}

pub fn patients() -> PatientRegistry {
    PatientRegistry::new(vec![
        Patient::new("p1", "Fatima", Some(Gender::Female)),
        Patient::new("p2", "Yusuf", Some(Gender::Male)),
        Patient::new("p3", "Walk-in", None),
    ])
    .unwrap()
}

pub fn booking(date: NaiveDate, hm: &str, room: &str, therapists: &[&str]) -> Appointment {
    Appointment {
        id: Uuid::new_v4(),
        date,
        slot: slot(hm),
        room_id: room.to_string(),
        therapist_ids: therapists.iter().map(|t| t.to_string()).collect(),
        client_id: "p2".to_string(),
        duration_minutes: 60,
        tab: AppointmentTab::Therapy,
        status: AppointmentStatus::Scheduled,
    }
}

pub fn request(start: NaiveDate, days: u32, hm: &str, room: &str, therapists: &[&str]) -> RecurringSlotRequest {
    RecurringSlotRequest {
        start_date: start,
        duration: BookingDuration::Preset(days),
        requested_slot: slot(hm),
        selected_therapists: therapists.iter().map(|t| t.to_string()).collect(),
        selected_room: room.to_string(),
        patient_id: Some("p1".to_string()),
    }
}

/// Owns everything a `SchedulingContext` borrows.
pub struct Fixture {
    pub appointments: Vec<Appointment>,
    pub registry: ClinicRegistry,
    pub timing: ClinicTimingTable,
    pub patient_gender: Option<Gender>,
    pub now: NaiveDateTime,
}

impl Fixture {
    pub fn new(appointments: Vec<Appointment>) -> Self {
        Self {
            appointments,
            registry: registry(),
            timing: ClinicTimingTable::default(),
            patient_gender: Some(Gender::Female),
            now: long_ago(),
        }
    }

    pub fn at(mut self, now: NaiveDateTime) -> Self {
        self.now = now;
        self
    }

    pub fn ctx(&self) -> SchedulingContext<'_> {
        SchedulingContext {
            appointments: &self.appointments,
            rooms: self.registry.rooms(),
            therapists: self.registry.therapists(),
            timing: &self.timing,
            patient_gender: self.patient_gender,
            now: self.now,
        }
    }
}

pub fn service_with(appointments: Vec<Appointment>, registry: ClinicRegistry) -> AppointmentBookingService {
    AppointmentBookingService::new(
        Arc::new(InMemoryAppointmentRepository::with_appointments(appointments)),
        Arc::new(registry),
        Arc::new(patients()),
        Arc::new(ClinicTimingTable::default()),
    )
}

pub fn service(appointments: Vec<Appointment>) -> AppointmentBookingService {
    service_with(appointments, registry())
}
