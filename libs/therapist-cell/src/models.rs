use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use shared_models::{Gender, TimeSlot};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub name: String,
}

impl Room {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Therapist {
    pub id: String,
    pub name: String,
    pub gender: Gender,
    /// Slots the therapist could work on each date. A ceiling, not booking state;
    /// a date with no entry is a day off.
    #[serde(default)]
    pub availability: BTreeMap<NaiveDate, BTreeSet<TimeSlot>>,
}

impl Therapist {
    pub fn new(id: &str, name: &str, gender: Gender) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            gender,
            availability: BTreeMap::new(),
        }
    }

    pub fn with_availability<I>(mut self, date: NaiveDate, slots: I) -> Self
    where
        I: IntoIterator<Item = TimeSlot>,
    {
        self.availability.entry(date).or_default().extend(slots);
        self
    }

    pub fn is_available_at(&self, date: NaiveDate, slot: TimeSlot) -> bool {
        self.availability
            .get(&date)
            .map(|slots| slots.contains(&slot))
            .unwrap_or(false)
    }

    pub fn available_slots(&self, date: NaiveDate) -> Vec<TimeSlot> {
        self.availability
            .get(&date)
            .map(|slots| slots.iter().copied().collect())
            .unwrap_or_default()
    }
}

/// Seed file layout for rooms and therapists. Unknown keys (e.g. `patients`)
/// are ignored so one file can seed every registry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RosterSeed {
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub therapists: Vec<Therapist>,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Room not found: {0}")]
    RoomNotFound(String),

    #[error("Therapist not found: {0}")]
    TherapistNotFound(String),

    #[error("Duplicate {kind} id: {id}")]
    DuplicateId { kind: &'static str, id: String },

    #[error("Failed to read roster file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse roster: {0}")]
    Parse(#[from] serde_json::Error),
}
