// libs/therapist-cell/src/services/availability.rs
//
// Queries over the therapist calendar ceiling. These answer "could this
// therapist work then", never "is this therapist free"; live booking state is
// the appointment cell's concern.

use chrono::NaiveDate;

use shared_models::TimeSlot;

use crate::models::Therapist;

/// Therapists whose calendar lists `slot` on `date`, in roster order.
pub fn therapists_working_at<'a, I>(roster: I, date: NaiveDate, slot: TimeSlot) -> Vec<&'a Therapist>
where
    I: IntoIterator<Item = &'a Therapist>,
{
    roster
        .into_iter()
        .filter(|t| t.is_available_at(date, slot))
        .collect()
}
