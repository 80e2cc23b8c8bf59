use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::calendar_age;
use crate::model::{Condition, Encounter, Medication, PatientRecord};

/// How many encounters the recent-history list keeps
pub const RECENT_ENCOUNTERS: usize = 3;

/// Derived facts about one patient, borrowed from its record
#[derive(Debug, Clone)]
pub struct PatientFacts<'a> {
    pub age: i32,
    pub active_conditions: Vec<&'a Condition>,
    pub active_medications: Vec<&'a Medication>,
    pub encounter_types: HashMap<&'a str, usize>,
    pub recent_encounters: Vec<&'a Encounter>,
}

impl PatientFacts<'_> {
    /// Most frequent encounter types, highest count first.
    ///
    /// Equal counts are ordered by description so the ranking does not depend
    /// on hash order.
    pub fn top_encounter_types(&self, n: usize) -> Vec<(&str, usize)> {
        let mut ranked: Vec<(&str, usize)> = self
            .encounter_types
            .iter()
            .map(|(description, count)| (*description, *count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(n);
        ranked
    }
}

pub fn aggregate_patient(record: &PatientRecord, now: DateTime<Utc>) -> PatientFacts<'_> {
    let age = calendar_age(record.patient.birthdate, now.date_naive());

    let active_conditions = record
        .conditions
        .iter()
        .filter(|c| c.is_active(now))
        .collect();
    let active_medications = record
        .medications
        .iter()
        .filter(|m| m.is_active(now))
        .collect();

    let mut encounter_types = HashMap::new();
    for encounter in &record.encounters {
        *encounter_types
            .entry(encounter.description.as_str())
            .or_insert(0) += 1;
    }

    let mut recent_encounters: Vec<&Encounter> = record.encounters.iter().collect();
    recent_encounters.sort_unstable_by(|a, b| b.start.cmp(&a.start));
    recent_encounters.truncate(RECENT_ENCOUNTERS);

    PatientFacts {
        age,
        active_conditions,
        active_medications,
        encounter_types,
        recent_encounters,
    }
}
