// libs/therapist-cell/src/services/matching.rs
use tracing::debug;

use shared_config::AppConfig;
use shared_models::Gender;

use crate::models::Therapist;

/// Clinic policy restricting therapist selection to the patient's gender.
///
/// Applied to rosters before any feasibility check; the feasibility check
/// itself never looks at gender.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenderMatchFilter {
    pub enforce_gender_match: bool,
}

impl GenderMatchFilter {
    pub fn new(enforce_gender_match: bool) -> Self {
        Self { enforce_gender_match }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.enforce_gender_match)
    }

    /// Whether the filter narrows the roster for this patient. `show_all` is
    /// the user's explicit override and always wins.
    pub fn is_active(&self, patient_gender: Option<Gender>, show_all: bool) -> bool {
        self.enforce_gender_match && patient_gender.is_some() && !show_all
    }

    pub fn matches(&self, therapist: &Therapist, patient_gender: Option<Gender>, show_all: bool) -> bool {
        if !self.is_active(patient_gender, show_all) {
            return true;
        }
        Some(therapist.gender) == patient_gender
    }

    pub fn filter_for_patient<'a>(
        &self,
        roster: &'a [Therapist],
        patient_gender: Option<Gender>,
        show_all: bool,
    ) -> Vec<&'a Therapist> {
        let filtered: Vec<&Therapist> = roster
            .iter()
            .filter(|t| self.matches(t, patient_gender, show_all))
            .collect();

        debug!(
            "Gender filter (enforced: {}, patient: {:?}, show_all: {}) kept {} of {} therapists",
            self.enforce_gender_match,
            patient_gender,
            show_all,
            filtered.len(),
            roster.len()
        );

        filtered
    }
}
