// libs/appointment-cell/src/services/timing.rs
use chrono::{Datelike, NaiveDate, Weekday};
use tracing::debug;

use shared_config::AppConfig;
use shared_models::TimeSlot;

use crate::models::AppointmentError;

/// Working days and the fixed, ordered slot sequence of the clinic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClinicTimingTable {
    working_days: Vec<Weekday>,
    slots: Vec<TimeSlot>,
    slot_minutes: u32,
}

impl Default for ClinicTimingTable {
    /// Monday to Saturday, hourly 07:00-17:00 with no 13:00 or 14:00 slot.
    fn default() -> Self {
        let slots = [7, 8, 9, 10, 11, 12, 15, 16, 17]
            .into_iter()
            .filter_map(|hour| TimeSlot::from_hm(hour, 0))
            .collect();

        Self::new(
            vec![Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri, Weekday::Sat],
            slots,
            60,
        )
    }
}

impl ClinicTimingTable {
    pub fn new(working_days: Vec<Weekday>, mut slots: Vec<TimeSlot>, slot_minutes: u32) -> Self {
        slots.sort();
        slots.dedup();
        Self {
            working_days,
            slots,
            slot_minutes,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AppointmentError> {
        let start = TimeSlot::parse(&config.slot_start)?.minutes_since_midnight();
        let end = TimeSlot::parse(&config.slot_end)?.minutes_since_midnight();
        if end < start {
            return Err(AppointmentError::InvalidTime(format!(
                "last slot {} starts before first slot {}",
                config.slot_end, config.slot_start
            )));
        }
        if config.slot_minutes == 0 {
            return Err(AppointmentError::ValidationError("slot width must be positive".to_string()));
        }

        let gap = match (&config.break_start, &config.break_end) {
            (Some(from), Some(to)) => Some((
                TimeSlot::parse(from)?.minutes_since_midnight(),
                TimeSlot::parse(to)?.minutes_since_midnight(),
            )),
            _ => None,
        };

        let mut slots = Vec::new();
        let mut minute = start;
        while minute <= end {
            let in_gap = gap.map_or(false, |(from, to)| minute >= from && minute < to);
            if !in_gap {
                if let Some(slot) = TimeSlot::from_hm(minute / 60, minute % 60) {
                    slots.push(slot);
                }
            }
            minute += config.slot_minutes;
        }

        let working_days = config
            .working_days
            .iter()
            .map(|day| {
                day.parse::<Weekday>()
                    .map_err(|_| AppointmentError::ValidationError(format!("unknown working day '{}'", day)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Clinic timing table: {} slots on {} working days", slots.len(), working_days.len());

        Ok(Self::new(working_days, slots, config.slot_minutes))
    }

    pub fn slot_minutes(&self) -> u32 {
        self.slot_minutes
    }

    pub fn working_days(&self) -> &[Weekday] {
        &self.working_days
    }

    pub fn all_slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        self.working_days.contains(&date.weekday())
    }

    /// Ordered slots defined for `date`; empty when the clinic is closed.
    pub fn slots_for(&self, date: NaiveDate) -> &[TimeSlot] {
        if self.is_working_day(date) {
            &self.slots
        } else {
            &[]
        }
    }

    pub fn contains(&self, date: NaiveDate, slot: TimeSlot) -> bool {
        self.slots_for(date).contains(&slot)
    }

    /// Slots strictly after `slot` on `date`, earliest first.
    pub fn slots_after(&self, date: NaiveDate, slot: TimeSlot) -> Vec<TimeSlot> {
        self.slots_for(date).iter().copied().filter(|s| *s > slot).collect()
    }

    /// Slots strictly before `slot` on `date`, nearest first.
    pub fn slots_before(&self, date: NaiveDate, slot: TimeSlot) -> Vec<TimeSlot> {
        self.slots_for(date)
            .iter()
            .rev()
            .copied()
            .filter(|s| *s < slot)
            .collect()
    }
}
