// libs/appointment-cell/src/services/conflict.rs
//
// Booking feasibility: the atomic room + therapist non-conflict test for one
// (date, slot). Pure functions over a snapshot of the appointment store.

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::{debug, warn};

use shared_models::TimeSlot;

use crate::models::{Appointment, BookingCandidate};

/// True iff the room is free at (date, slot) and none of the therapists is
/// booked in any room at that slot.
///
/// Does not consult therapist calendars or gender; callers filter candidates
/// before asking.
pub fn can_book_appointment(candidate: &BookingCandidate, appointments: &[Appointment]) -> bool {
    let conflicts = find_conflicts(candidate, appointments);

    if !conflicts.is_empty() {
        debug!(
            "Room {} with {:?} at {} on {} conflicts with {} booking(s)",
            candidate.room_number,
            candidate.therapist_ids,
            candidate.slot,
            candidate.date,
            conflicts.len()
        );
    }

    conflicts.is_empty()
}

/// Every active booking at the candidate's (date, slot) that holds its room
/// or any of its therapists.
pub fn find_conflicts<'a>(candidate: &BookingCandidate, appointments: &'a [Appointment]) -> Vec<&'a Appointment> {
    appointments
        .iter()
        .filter(|apt| apt.occupies(candidate.date, candidate.slot))
        .filter(|apt| {
            apt.room_id == candidate.room_number
                || candidate.therapist_ids.iter().any(|id| apt.involves_therapist(id))
        })
        .collect()
}

pub fn booking_in_room<'a>(
    appointments: &'a [Appointment],
    room_id: &str,
    date: NaiveDate,
    slot: TimeSlot,
) -> Option<&'a Appointment> {
    let mut bookings = appointments.iter().filter(|apt| apt.occupies_room(room_id, date, slot));
    let first = bookings.next();

    if bookings.next().is_some() {
        warn!("Room {} is double-booked at {} on {}", room_id, slot, date);
    }

    first
}

pub fn is_room_booked(appointments: &[Appointment], room_id: &str, date: NaiveDate, slot: TimeSlot) -> bool {
    booking_in_room(appointments, room_id, date, slot).is_some()
}

pub fn is_therapist_booked(appointments: &[Appointment], therapist_id: &str, date: NaiveDate, slot: TimeSlot) -> bool {
    appointments
        .iter()
        .any(|apt| apt.occupies(date, slot) && apt.involves_therapist(therapist_id))
}

/// Ids of therapists committed to any room at (date, slot).
pub fn busy_therapist_ids(appointments: &[Appointment], date: NaiveDate, slot: TimeSlot) -> HashSet<&str> {
    appointments
        .iter()
        .filter(|apt| apt.occupies(date, slot))
        .flat_map(|apt| apt.therapist_ids.iter().map(String::as_str))
        .collect()
}

pub fn any_therapist_busy(
    appointments: &[Appointment],
    therapist_ids: &[String],
    date: NaiveDate,
    slot: TimeSlot,
) -> bool {
    therapist_ids
        .iter()
        .any(|id| is_therapist_booked(appointments, id, date, slot))
}
