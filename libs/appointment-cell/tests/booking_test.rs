// libs/appointment-cell/tests/booking_test.rs

mod common;

use assert_matches::assert_matches;
use chrono::{Duration, NaiveDate};
use uuid::Uuid;

use appointment_cell::{
    AppointmentError, AppointmentStatus, AppointmentTab, BookAppointmentRequest, BookingCandidate, DateRange,
    RecurringBookingRequest, RescheduleAppointmentRequest, UnavailableReason,
};

use common::*;

fn book_request(date: NaiveDate, hm: &str, room: &str, therapists: &[&str]) -> BookAppointmentRequest {
    BookAppointmentRequest {
        date,
        slot: slot(hm),
        room_id: room.to_string(),
        therapist_ids: therapists.iter().map(|t| t.to_string()).collect(),
        client_id: "p1".to_string(),
        duration_minutes: None,
        tab: AppointmentTab::Therapy,
    }
}

#[test]
fn test_book_appointment_persists_and_blocks_slot() {
    let service = service(vec![]);

    let booked = service
        .book_appointment(book_request(day(), "09:00", "r1", &["t1"]), long_ago())
        .unwrap();
    assert_eq!(booked.status, AppointmentStatus::Scheduled);
    assert_eq!(booked.duration_minutes, 60);

    let stored = service.list_appointments(DateRange::single(day())).unwrap();
    assert_eq!(stored, vec![booked.clone()]);

    let again = service.book_appointment(book_request(day(), "09:00", "r1", &["t2"]), long_ago());
    assert_matches!(again, Err(AppointmentError::ConflictDetected { .. }));

    let therapist_elsewhere = service.book_appointment(book_request(day(), "09:00", "r2", &["t1"]), long_ago());
    assert_matches!(therapist_elsewhere, Err(AppointmentError::ConflictDetected { .. }));

    let candidate = BookingCandidate {
        therapist_ids: vec!["t2".to_string()],
        room_number: "r2".to_string(),
        date: day(),
        slot: slot("09:00"),
    };
    assert!(service.check_feasibility(&candidate).unwrap());
}

#[test]
fn test_book_appointment_validation() {
    let service = service(vec![]);
    let sunday = NaiveDate::from_ymd_opt(2025, 5, 25).unwrap();
    let beyond_calendar = day() + Duration::days(8);

    assert_matches!(
        service.book_appointment(book_request(sunday, "09:00", "r1", &["t1"]), long_ago()),
        Err(AppointmentError::ClinicClosed(date)) if date == sunday
    );
    assert_matches!(
        service.book_appointment(book_request(day(), "14:00", "r1", &["t1"]), long_ago()),
        Err(AppointmentError::InvalidTime(_))
    );
    assert_matches!(
        service.book_appointment(book_request(day(), "09:00", "r1", &[]), long_ago()),
        Err(AppointmentError::NoTherapistsSelected)
    );
    assert_matches!(
        service.book_appointment(book_request(day(), "09:00", "r9", &["t1"]), long_ago()),
        Err(AppointmentError::RoomNotFound(room)) if room == "r9"
    );
    assert_matches!(
        service.book_appointment(book_request(day(), "09:00", "r1", &["t1", "t9"]), long_ago()),
        Err(AppointmentError::TherapistNotFound(id)) if id == "t9"
    );
    assert_matches!(
        service.book_appointment(book_request(beyond_calendar, "09:00", "r1", &["t1"]), long_ago()),
        Err(AppointmentError::TherapistNotAvailable { therapist_id, .. }) if therapist_id == "t1"
    );
    assert_matches!(
        service.book_appointment(book_request(day(), "09:00", "r1", &["t1"]), at(day(), "09:00")),
        Err(AppointmentError::SlotInPast { .. })
    );

    let mut unknown_patient = book_request(day(), "09:00", "r1", &["t1"]);
    unknown_patient.client_id = "p9".to_string();
    assert_matches!(
        service.book_appointment(unknown_patient, long_ago()),
        Err(AppointmentError::PatientNotFound(id)) if id == "p9"
    );

    assert!(service.list_appointments(DateRange::unbounded()).unwrap().is_empty());
}

#[test]
fn test_book_recurring_skips_conflicted_days() {
    let wednesday = day() + Duration::days(1);
    let service = service(vec![booking(wednesday, "09:00", "r1", &["t2"])]);

    let request = RecurringBookingRequest {
        request: request(day(), 3, "09:00", "r1", &["t1"]),
        duration_minutes: Some(45),
        tab: AppointmentTab::Therapy,
    };
    let response = service.book_recurring(request, long_ago()).unwrap();

    assert_eq!(
        response.booked.iter().map(|a| a.date).collect::<Vec<_>>(),
        vec![day(), day() + Duration::days(2)]
    );
    assert!(response.booked.iter().all(|a| a.duration_minutes == 45 && a.client_id == "p1"));

    assert_eq!(response.skipped.len(), 1);
    let skipped = &response.skipped[0];
    assert_eq!(skipped.date, wednesday);
    assert_eq!(skipped.reason, UnavailableReason::RoomUnavailable.to_string());
    assert_eq!(skipped.alternatives.len(), 2);

    assert_eq!(service.list_appointments(DateRange::unbounded()).unwrap().len(), 3);
}

#[test]
fn test_book_recurring_requires_known_patient() {
    let service = service(vec![]);

    let mut anonymous = request(day(), 1, "09:00", "r1", &["t1"]);
    anonymous.patient_id = None;
    let result = service.book_recurring(
        RecurringBookingRequest {
            request: anonymous,
            duration_minutes: None,
            tab: AppointmentTab::Therapy,
        },
        long_ago(),
    );
    assert_matches!(result, Err(AppointmentError::ValidationError(_)));

    let mut unknown = request(day(), 1, "09:00", "r1", &["t1"]);
    unknown.patient_id = Some("p9".to_string());
    let result = service.book_recurring(
        RecurringBookingRequest {
            request: unknown,
            duration_minutes: None,
            tab: AppointmentTab::Therapy,
        },
        long_ago(),
    );
    assert_matches!(result, Err(AppointmentError::PatientNotFound(_)));
}

#[test]
fn test_recurring_alternatives_tolerates_unknown_patient() {
    let service = service(vec![]);
    let mut req = request(day(), 1, "09:00", "r1", &["t1"]);
    req.patient_id = Some("p9".to_string());

    let results = service.recurring_alternatives(&req, long_ago()).unwrap();
    assert!(results[&day()].available);
}

#[test]
fn test_reschedule_ignores_own_booking_and_checks_others() {
    let blocker = booking(day(), "11:00", "r1", &["t2"]);
    let service = service(vec![blocker]);
    let booked = service
        .book_appointment(book_request(day(), "09:00", "r1", &["t1"]), long_ago())
        .unwrap();

    let same_place = RescheduleAppointmentRequest { date: None, slot: None, room_id: Some("r1".to_string()) };
    assert!(service.reschedule_appointment(booked.id, same_place, long_ago()).is_ok());

    let onto_blocker = RescheduleAppointmentRequest { date: None, slot: Some(slot("11:00")), room_id: None };
    assert_matches!(
        service.reschedule_appointment(booked.id, onto_blocker, long_ago()),
        Err(AppointmentError::ConflictDetected { .. })
    );

    let moved = service
        .reschedule_appointment(
            booked.id,
            RescheduleAppointmentRequest { date: None, slot: Some(slot("10:00")), room_id: Some("r2".to_string()) },
            long_ago(),
        )
        .unwrap();
    assert_eq!((moved.slot, moved.room_id.as_str()), (slot("10:00"), "r2"));
    assert_eq!(service.get_appointment(booked.id).unwrap(), moved);

    assert_matches!(
        service.reschedule_appointment(
            Uuid::new_v4(),
            RescheduleAppointmentRequest { date: None, slot: None, room_id: None },
            long_ago()
        ),
        Err(AppointmentError::NotFound(_))
    );
}

#[test]
fn test_cancel_releases_slot_once() {
    let service = service(vec![]);
    let booked = service
        .book_appointment(book_request(day(), "09:00", "r1", &["t1"]), long_ago())
        .unwrap();

    let cancelled = service.cancel_appointment(booked.id).unwrap();
    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);

    assert_matches!(
        service.cancel_appointment(booked.id),
        Err(AppointmentError::InvalidStatusTransition(AppointmentStatus::Cancelled))
    );

    let rebooked = service.book_appointment(book_request(day(), "09:00", "r1", &["t1"]), long_ago());
    assert!(rebooked.is_ok());

    let matrix = service.schedule_matrix(day(), long_ago()).unwrap();
    let cell = matrix[0].cell(slot("09:00")).unwrap();
    assert_eq!(cell.booking.as_ref().map(|b| b.id), rebooked.ok().map(|a| a.id));
}
