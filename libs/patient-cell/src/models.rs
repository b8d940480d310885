use serde::{Deserialize, Serialize};

use shared_models::Gender;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub id: String,
    pub name: String,
    /// Drives the optional therapist gender-match policy; unknown means no filtering.
    #[serde(default)]
    pub gender: Option<Gender>,
}

impl Patient {
    pub fn new(id: &str, name: &str, gender: Option<Gender>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            gender,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientSeed {
    #[serde(default)]
    pub patients: Vec<Patient>,
}

#[derive(Debug, thiserror::Error)]
pub enum PatientError {
    #[error("Patient not found: {0}")]
    NotFound(String),

    #[error("Duplicate patient id: {0}")]
    DuplicateId(String),
}
