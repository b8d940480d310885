// libs/shared/models/src/schedule.rs
//
// Value types shared by every scheduling cell: clock slots, clinic dates and
// the gender attribute used for therapist matching.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

static SLOT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01]\d|2[0-3]):([0-5]\d)$").expect("valid slot regex"));

static DATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date regex"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleParseError {
    #[error("Invalid time slot '{0}', expected HH:MM")]
    InvalidSlot(String),

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Unknown gender '{0}'")]
    InvalidGender(String),
}

/// A clock time (`HH:MM`, 24h) marking the start of a clinic slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeSlot(NaiveTime);

impl TimeSlot {
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(TimeSlot)
    }

    pub fn parse(value: &str) -> Result<Self, ScheduleParseError> {
        let captures = SLOT_PATTERN
            .captures(value.trim())
            .ok_or_else(|| ScheduleParseError::InvalidSlot(value.to_string()))?;

        let hour: u32 = captures[1]
            .parse()
            .map_err(|_| ScheduleParseError::InvalidSlot(value.to_string()))?;
        let minute: u32 = captures[2]
            .parse()
            .map_err(|_| ScheduleParseError::InvalidSlot(value.to_string()))?;

        Self::from_hm(hour, minute).ok_or_else(|| ScheduleParseError::InvalidSlot(value.to_string()))
    }

    pub fn time(&self) -> NaiveTime {
        self.0
    }

    pub fn minutes_since_midnight(&self) -> u32 {
        self.0.hour() * 60 + self.0.minute()
    }

    /// Naive start of this slot on `date`, i.e. `{date}T{slot}:00`.
    pub fn starts_at(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.0)
    }

    /// A slot that has already started (start <= now) can no longer be offered.
    pub fn is_past(&self, date: NaiveDate, now: NaiveDateTime) -> bool {
        self.starts_at(date) <= now
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl FromStr for TimeSlot {
    type Err = ScheduleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeSlot::parse(s)
    }
}

impl Serialize for TimeSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeSlot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        TimeSlot::parse(&raw).map_err(de::Error::custom)
    }
}

/// Strict `YYYY-MM-DD` parsing for dates arriving as plain strings.
pub fn parse_clinic_date(value: &str) -> Result<NaiveDate, ScheduleParseError> {
    let trimmed = value.trim();
    if !DATE_PATTERN.is_match(trimmed) {
        return Err(ScheduleParseError::InvalidDate(value.to_string()));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|_| ScheduleParseError::InvalidDate(value.to_string()))
}

/// Serde adapter for request dates; rejects anything `parse_clinic_date` does,
/// including chrono's signed extended-year form.
pub fn deserialize_clinic_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_clinic_date(&raw).map_err(de::Error::custom)
}

pub fn deserialize_optional_clinic_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|raw| parse_clinic_date(&raw).map_err(de::Error::custom))
        .transpose()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[serde(alias = "Male", alias = "M", alias = "m")]
    Male,
    #[serde(alias = "Female", alias = "F", alias = "f")]
    Female,
    #[serde(alias = "Other")]
    Other,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "male"),
            Gender::Female => write!(f, "female"),
            Gender::Other => write!(f, "other"),
        }
    }
}

impl FromStr for Gender {
    type Err = ScheduleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            _ => Err(ScheduleParseError::InvalidGender(s.to_string())),
        }
    }
}
