// libs/appointment-cell/src/services/alternatives.rs
//
// Recurring alternative finder. Expands a multi-day request into per-day
// feasibility and, for infeasible days, searches substitute slots and rooms in
// a fixed priority order.
//
// Same-slot tiers collect every hit (`collect_all`); other-slot tiers stop at
// the first hit (`find_first`).

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate, NaiveDateTime};
use tracing::{debug, instrument, warn};

use shared_models::{Gender, TimeSlot};
use therapist_cell::models::{Room, Therapist};
use therapist_cell::services::availability::therapists_working_at;

use crate::models::{
    AlternativeResult, AlternativeSlot, Appointment, BookingCandidate, RecurringSlotRequest, UnavailableReason,
};
use crate::services::conflict::{any_therapist_busy, can_book_appointment};
use crate::services::timing::ClinicTimingTable;

/// Everything the finder reads. Built from a consistent snapshot by the caller;
/// `now` is explicit so results are deterministic.
#[derive(Debug, Clone, Copy)]
pub struct SchedulingContext<'a> {
    pub appointments: &'a [Appointment],
    pub rooms: &'a [Room],
    pub therapists: &'a [Therapist],
    pub timing: &'a ClinicTimingTable,
    pub patient_gender: Option<Gender>,
    pub now: NaiveDateTime,
}

/// Accumulate every candidate `accept` maps to a value, in candidate order.
pub fn collect_all<C, T>(candidates: impl IntoIterator<Item = C>, accept: impl FnMut(C) -> Option<T>) -> Vec<T> {
    candidates.into_iter().filter_map(accept).collect()
}

/// The first candidate `accept` maps to a value, scanning in candidate order.
pub fn find_first<C, T>(candidates: impl IntoIterator<Item = C>, accept: impl FnMut(C) -> Option<T>) -> Option<T> {
    candidates.into_iter().find_map(accept)
}

/// Per-day outcome for every date of a recurring request.
///
/// Never fails: an unresolvable day count yields an empty map, the range stops
/// at the last representable date, and each day is judged independently.
#[instrument(
    skip(request, ctx),
    fields(
        start_date = %request.start_date,
        slot = %request.requested_slot,
        room = %request.selected_room
    )
)]
pub fn get_recurring_slot_alternatives(
    request: &RecurringSlotRequest,
    ctx: &SchedulingContext<'_>,
) -> BTreeMap<NaiveDate, AlternativeResult> {
    let days = request.duration.resolve_days();
    if days == 0 {
        warn!("Recurring request resolved to no days ({:?})", request.duration);
        return BTreeMap::new();
    }

    (0..days)
        .map_while(|offset| request.start_date.checked_add_days(Days::new(u64::from(offset))))
        .map(|date| (date, evaluate_day(request, date, ctx)))
        .collect()
}

fn evaluate_day(request: &RecurringSlotRequest, date: NaiveDate, ctx: &SchedulingContext<'_>) -> AlternativeResult {
    let slot = request.requested_slot;

    if !ctx.timing.is_working_day(date) {
        debug!("{} is not a working day", date);
        return AlternativeResult::unavailable(UnavailableReason::ClinicClosed, Vec::new());
    }

    if slot.is_past(date, ctx.now) {
        let alternatives = past_slot_alternatives(request, date, ctx);
        debug!("{} {} is in the past, {} alternative(s)", date, slot, alternatives.len());
        return AlternativeResult::unavailable(UnavailableReason::SlotInPast, alternatives);
    }

    let requested = candidate(&request.selected_therapists, &request.selected_room, date, slot);
    if can_book_appointment(&requested, ctx.appointments) {
        return AlternativeResult::available();
    }

    let alternatives = future_slot_alternatives(request, date, ctx);

    let reason = if !alternatives.is_empty() {
        UnavailableReason::RoomUnavailable
    } else if any_therapist_busy(ctx.appointments, &request.selected_therapists, date, slot) {
        UnavailableReason::TherapistsBusy
    } else {
        UnavailableReason::RoomUnavailable
    };

    debug!("{} {} unavailable ({}), {} alternative(s)", date, slot, reason, alternatives.len());
    AlternativeResult::unavailable(reason, alternatives)
}

/// Requested slot has already started.
///
/// Replacements always share the patient's gender when it is known, whatever
/// the clinic-wide matching policy; an unknown gender opens the whole roster.
///
/// 1. Same slot: every room where some other matching therapist could take the
///    session (collect-all).
/// 2. Otherwise the first later, not-yet-started slot where either the original
///    team and room, or any matching therapist in any room, is free
///    (find-first).
fn past_slot_alternatives(request: &RecurringSlotRequest, date: NaiveDate, ctx: &SchedulingContext<'_>) -> Vec<AlternativeSlot> {
    let slot = request.requested_slot;
    let matched = same_gender_roster(ctx.therapists, ctx.patient_gender);

    let replacements: Vec<&Therapist> = therapists_working_at(matched.iter().copied(), date, slot)
        .into_iter()
        .filter(|t| !request.selected_therapists.contains(&t.id))
        .collect();

    let same_slot = collect_all(ctx.rooms, |room| {
        any_therapist_fits(&replacements, &room.id, date, slot, ctx.appointments)
            .then(|| AlternativeSlot::new(slot, &room.id))
    });
    if !same_slot.is_empty() {
        return same_slot;
    }

    let later_slots = ctx
        .timing
        .slots_after(date, slot)
        .into_iter()
        .filter(|next| !next.is_past(date, ctx.now));

    find_first(later_slots, |next| {
        let original = candidate(&request.selected_therapists, &request.selected_room, date, next);
        if can_book_appointment(&original, ctx.appointments) {
            return Some(AlternativeSlot::new(next, &request.selected_room));
        }

        let working = therapists_working_at(matched.iter().copied(), date, next);

        find_first(ctx.rooms, |room| {
            any_therapist_fits(&working, &room.id, date, next, ctx.appointments)
                .then(|| AlternativeSlot::new(next, &room.id))
        })
    })
    .into_iter()
    .collect()
}

/// Requested slot is still ahead but infeasible. Tiers, each tried only when
/// the previous one found nothing:
///
/// a. same slot, same therapists, any other room (collect-all)
/// b. later slots ascending, same room and therapists (find-first)
/// c. earlier slots nearest-first, same room and therapists, skipping slots
///    that have started (find-first)
fn future_slot_alternatives(request: &RecurringSlotRequest, date: NaiveDate, ctx: &SchedulingContext<'_>) -> Vec<AlternativeSlot> {
    let slot = request.requested_slot;
    let team = &request.selected_therapists;
    let room_id = request.selected_room.as_str();

    let other_rooms = ctx.rooms.iter().filter(|room| room.id != room_id);
    let same_slot = collect_all(other_rooms, |room| {
        can_book_appointment(&candidate(team, &room.id, date, slot), ctx.appointments)
            .then(|| AlternativeSlot::new(slot, &room.id))
    });
    if !same_slot.is_empty() {
        return same_slot;
    }

    let same_room_at = |at: TimeSlot| {
        can_book_appointment(&candidate(team, room_id, date, at), ctx.appointments)
            .then(|| AlternativeSlot::new(at, room_id))
    };

    let later = ctx
        .timing
        .slots_after(date, slot)
        .into_iter()
        .filter(|at| !at.is_past(date, ctx.now));
    if let Some(hit) = find_first(later, &same_room_at) {
        return vec![hit];
    }

    let earlier = ctx
        .timing
        .slots_before(date, slot)
        .into_iter()
        .filter(|at| !at.is_past(date, ctx.now));
    find_first(earlier, &same_room_at).into_iter().collect()
}

fn same_gender_roster(therapists: &[Therapist], patient_gender: Option<Gender>) -> Vec<&Therapist> {
    therapists
        .iter()
        .filter(|t| patient_gender.map_or(true, |gender| t.gender == gender))
        .collect()
}

fn any_therapist_fits(
    therapists: &[&Therapist],
    room_id: &str,
    date: NaiveDate,
    slot: TimeSlot,
    appointments: &[Appointment],
) -> bool {
    therapists.iter().any(|t| {
        let solo = candidate(std::slice::from_ref(&t.id), room_id, date, slot);
        can_book_appointment(&solo, appointments)
    })
}

fn candidate(therapist_ids: &[String], room_id: &str, date: NaiveDate, slot: TimeSlot) -> BookingCandidate {
    BookingCandidate {
        therapist_ids: therapist_ids.to_vec(),
        room_number: room_id.to_string(),
        date,
        slot,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_all_keeps_every_hit_in_order() {
        let hits = collect_all([1, 2, 3, 4, 5], |n| (n % 2 == 1).then_some(n * 10));
        assert_eq!(hits, vec![10, 30, 50]);
    }

    #[test]
    fn test_find_first_stops_at_first_hit() {
        let mut seen = Vec::new();
        let hit = find_first([1, 2, 3, 4], |n| {
            seen.push(n);
            (n >= 2).then_some(n)
        });
        assert_eq!(hit, Some(2));
        assert_eq!(seen, vec![1, 2]);
    }
}
