use std::env;
use tracing::warn;

/// Clinic-wide settings read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub enforce_gender_match: bool,
    pub slot_start: String,
    pub slot_end: String,
    pub slot_minutes: u32,
    pub break_start: Option<String>,
    pub break_end: Option<String>,
    pub working_days: Vec<String>,
    pub roster_path: Option<String>,
    pub bind_addr: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            enforce_gender_match: false,
            slot_start: "07:00".to_string(),
            slot_end: "17:00".to_string(),
            slot_minutes: 60,
            break_start: Some("13:00".to_string()),
            break_end: Some("15:00".to_string()),
            working_days: ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]
                .iter()
                .map(|d| d.to_string())
                .collect(),
            roster_path: None,
            bind_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let enforce_gender_match = match env::var("CLINIC_ENFORCE_GENDER_MATCH") {
            Ok(value) => parse_flag(&value).unwrap_or_else(|| {
                warn!("CLINIC_ENFORCE_GENDER_MATCH has unrecognised value '{}', gender matching disabled", value);
                false
            }),
            Err(_) => defaults.enforce_gender_match,
        };

        let slot_minutes = match env::var("CLINIC_SLOT_MINUTES") {
            Ok(value) => value.parse::<u32>().ok().filter(|m| *m > 0).unwrap_or_else(|| {
                warn!("CLINIC_SLOT_MINUTES is not a positive integer ('{}'), using {}", value, defaults.slot_minutes);
                defaults.slot_minutes
            }),
            Err(_) => defaults.slot_minutes,
        };

        let working_days = match env::var("CLINIC_WORKING_DAYS") {
            Ok(value) => value
                .split(',')
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty())
                .collect(),
            Err(_) => defaults.working_days,
        };

        let config = Self {
            enforce_gender_match,
            slot_start: env::var("CLINIC_SLOT_START").unwrap_or_else(|_| {
                warn!("CLINIC_SLOT_START not set, using default {}", defaults.slot_start);
                defaults.slot_start.clone()
            }),
            slot_end: env::var("CLINIC_SLOT_END").unwrap_or_else(|_| {
                warn!("CLINIC_SLOT_END not set, using default {}", defaults.slot_end);
                defaults.slot_end.clone()
            }),
            slot_minutes,
            break_start: env::var("CLINIC_BREAK_START").ok().or(defaults.break_start),
            break_end: env::var("CLINIC_BREAK_END").ok().or(defaults.break_end),
            working_days,
            roster_path: env::var("CLINIC_ROSTER_PATH").ok(),
            bind_addr: env::var("CLINIC_BIND_ADDR").unwrap_or(defaults.bind_addr),
        };

        if config.roster_path.is_none() {
            warn!("CLINIC_ROSTER_PATH not set, using the built-in demo roster");
        }

        config
    }

    pub fn has_break(&self) -> bool {
        self.break_start.is_some() && self.break_end.is_some()
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
