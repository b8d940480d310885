use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use shared_models::Gender;

use crate::models::{Patient, PatientError, PatientSeed};

/// In-memory patient roster. Only what the scheduler needs: identity and gender.
#[derive(Debug, Clone, Default)]
pub struct PatientRegistry {
    patients: Vec<Patient>,
}

impl PatientRegistry {
    pub fn new(patients: Vec<Patient>) -> Result<Self, PatientError> {
        let mut seen = HashSet::new();
        for patient in &patients {
            if !seen.insert(patient.id.as_str()) {
                return Err(PatientError::DuplicateId(patient.id.clone()));
            }
        }

        debug!("Patient registry built with {} patients", patients.len());
        Ok(Self { patients })
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let seed: PatientSeed = serde_json::from_str(json).context("Failed to parse patient roster")?;
        Ok(Self::new(seed.patients)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading patient roster from {}", path.display());
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read patient roster {}", path.display()))?;
        Self::from_json_str(&contents)
    }

    pub fn demo() -> Self {
        Self {
            patients: vec![
                Patient::new("p1", "Fatima Noor", Some(Gender::Female)),
                Patient::new("p2", "Yusuf Rahman", Some(Gender::Male)),
                Patient::new("p3", "Walk-in Client", None),
            ],
        }
    }

    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    pub fn get(&self, patient_id: &str) -> Option<&Patient> {
        self.patients.iter().find(|p| p.id == patient_id)
    }

    pub fn require(&self, patient_id: &str) -> Result<&Patient, PatientError> {
        self.get(patient_id)
            .ok_or_else(|| PatientError::NotFound(patient_id.to_string()))
    }

    /// Gender of a known patient; `None` for unknown patients or unrecorded gender.
    pub fn gender_of(&self, patient_id: &str) -> Option<Gender> {
        self.get(patient_id).and_then(|p| p.gender)
    }
}
