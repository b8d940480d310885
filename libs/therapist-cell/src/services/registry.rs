// libs/therapist-cell/src/services/registry.rs
use std::collections::HashSet;
use std::path::Path;

use chrono::{Duration, NaiveDate};
use tracing::{debug, info};

use shared_models::{Gender, TimeSlot};

use crate::models::{RegistryError, Room, RosterSeed, Therapist};

/// Static room and therapist rosters, loaded once at startup.
///
/// Registry order is significant: every search in the scheduling engine scans
/// rooms and therapists in the order they appear here.
#[derive(Debug, Clone, Default)]
pub struct ClinicRegistry {
    rooms: Vec<Room>,
    therapists: Vec<Therapist>,
}

impl ClinicRegistry {
    pub fn new(rooms: Vec<Room>, therapists: Vec<Therapist>) -> Result<Self, RegistryError> {
        ensure_unique("room", rooms.iter().map(|r| r.id.as_str()))?;
        ensure_unique("therapist", therapists.iter().map(|t| t.id.as_str()))?;

        debug!("Registry built with {} rooms and {} therapists", rooms.len(), therapists.len());

        Ok(Self { rooms, therapists })
    }

    pub fn from_seed(seed: RosterSeed) -> Result<Self, RegistryError> {
        Self::new(seed.rooms, seed.therapists)
    }

    pub fn from_json_str(json: &str) -> Result<Self, RegistryError> {
        let seed: RosterSeed = serde_json::from_str(json)?;
        Self::from_seed(seed)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        info!("Loading clinic roster from {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Built-in demo roster: four rooms and four therapists whose calendars
    /// cover `days` consecutive dates from `start`.
    pub fn demo(start: NaiveDate, days: u32, slots: &[TimeSlot]) -> Self {
        let rooms = (1..=4)
            .map(|n| Room::new(&format!("r{}", n), &format!("Therapy Room {}", n)))
            .collect();

        let noon = TimeSlot::from_hm(13, 0);
        let morning: Vec<TimeSlot> = slots
            .iter()
            .copied()
            .filter(|s| noon.map_or(true, |noon| *s < noon))
            .collect();
        let afternoon: Vec<TimeSlot> = slots
            .iter()
            .copied()
            .filter(|s| noon.map_or(true, |noon| *s >= noon))
            .collect();

        let mut therapists = vec![
            Therapist::new("t1", "Aisha Khan", Gender::Female),
            Therapist::new("t2", "Omar Farouk", Gender::Male),
            Therapist::new("t3", "Sara Malik", Gender::Female),
            Therapist::new("t4", "Bilal Ahmed", Gender::Male),
        ];

        for offset in 0..days {
            let date = start + Duration::days(i64::from(offset));
            for therapist in therapists.iter_mut() {
                let day_slots = match therapist.id.as_str() {
                    "t3" => morning.clone(),
                    "t4" => afternoon.clone(),
                    _ => slots.to_vec(),
                };
                therapist.availability.entry(date).or_default().extend(day_slots);
            }
        }

        Self { rooms, therapists }
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn therapists(&self) -> &[Therapist] {
        &self.therapists
    }

    pub fn room(&self, room_id: &str) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == room_id)
    }

    pub fn therapist(&self, therapist_id: &str) -> Option<&Therapist> {
        self.therapists.iter().find(|t| t.id == therapist_id)
    }

    pub fn require_room(&self, room_id: &str) -> Result<&Room, RegistryError> {
        self.room(room_id)
            .ok_or_else(|| RegistryError::RoomNotFound(room_id.to_string()))
    }

    pub fn require_therapist(&self, therapist_id: &str) -> Result<&Therapist, RegistryError> {
        self.therapist(therapist_id)
            .ok_or_else(|| RegistryError::TherapistNotFound(therapist_id.to_string()))
    }
}

fn ensure_unique<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), RegistryError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(RegistryError::DuplicateId { kind, id: id.to_string() });
        }
    }
    Ok(())
}
