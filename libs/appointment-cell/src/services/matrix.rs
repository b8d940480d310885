// libs/appointment-cell/src/services/matrix.rs
use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, instrument};

use therapist_cell::models::{Room, Therapist};

use crate::models::{Appointment, MatrixCell, RoomMatrix};
use crate::services::conflict::{booking_in_room, busy_therapist_ids};
use crate::services::timing::ClinicTimingTable;

/// Room x slot availability grid for one date.
///
/// Therapist exclusivity is per slot, not per room: a therapist booked at the
/// slot appears in no room, and each free therapist is listed in every
/// available room.
///
/// A snapshot: a therapist listed as available is only guaranteed free at the
/// instant the grid was built, so bookings must be re-checked on commit.
#[instrument(skip(appointments, rooms, therapists, timing), fields(rooms = rooms.len()))]
pub fn build_schedule_matrix(
    date: NaiveDate,
    appointments: &[Appointment],
    rooms: &[Room],
    therapists: &[Therapist],
    timing: &ClinicTimingTable,
    now: NaiveDateTime,
) -> Vec<RoomMatrix> {
    let slots = timing.slots_for(date);

    // Therapist commitments are global across rooms, so compute them once per slot.
    let busy_by_slot: Vec<_> = slots
        .iter()
        .map(|slot| busy_therapist_ids(appointments, date, *slot))
        .collect();

    let matrix: Vec<RoomMatrix> = rooms
        .iter()
        .map(|room| {
            let cells = slots
                .iter()
                .zip(busy_by_slot.iter())
                .map(|(slot, busy)| {
                    let is_past = slot.is_past(date, now);
                    let booking = booking_in_room(appointments, &room.id, date, *slot).cloned();
                    let is_booked = booking.is_some();
                    let is_room_available = !is_past && !is_booked;

                    let available_therapists = if is_room_available {
                        therapists
                            .iter()
                            .filter(|t| !busy.contains(t.id.as_str()))
                            .map(|t| t.id.clone())
                            .collect()
                    } else {
                        Vec::new()
                    };

                    MatrixCell {
                        slot: *slot,
                        is_past,
                        is_booked,
                        is_room_available,
                        available_therapists,
                        booking,
                    }
                })
                .collect();

            RoomMatrix {
                room_id: room.id.clone(),
                room_name: room.name.clone(),
                cells,
            }
        })
        .collect();

    debug!("Built schedule matrix for {}: {} rooms x {} slots", date, matrix.len(), slots.len());

    matrix
}
