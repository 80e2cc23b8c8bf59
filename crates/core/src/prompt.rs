//! Prompt templates for the generative text gateway
//!
//! Both builders are pure: everything they render comes from their arguments.
//! The patient's first and last name are never rendered, even though the
//! record carries them.

use std::fmt::{self, Write};

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::aggregate::{ClusterFacts, PatientFacts};
use crate::model::{ClusterMethod, Episode, PatientRecord};

/// Number of encounter types listed in the patient prompt
const TOP_ENCOUNTER_TYPES: usize = 3;

/// Per-request marker appended to patient prompts.
///
/// Nudges the model away from returning a cached reply when the same patient
/// is summarized repeatedly. Carries no meaning beyond that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken {
    pub millis: i64,
    pub nonce: u16,
}

impl RequestToken {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            millis: now.timestamp_millis(),
            nonce: rand::thread_rng().gen_range(0..1000),
        }
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.millis, self.nonce)
    }
}

/// Collapse a stored free-text value onto a single line.
fn inline(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn day(instant: DateTime<Utc>) -> String {
    instant.format("%Y-%m-%d").to_string()
}

fn since_line(e: &Episode) -> String {
    format!("- {} (since {})", inline(&e.description), day(e.start))
}

fn range_line(e: &Episode) -> String {
    let stop = e.stop.map(day).unwrap_or_else(|| "Active".to_string());
    format!("- {} ({} to {})", inline(&e.description), day(e.start), stop)
}

// writeln! into a String cannot fail
fn section(out: &mut String, title: &str, lines: &[String]) {
    let _ = writeln!(out, "{title} ({}):", lines.len());
    for line in lines {
        let _ = writeln!(out, "{line}");
    }
    out.push('\n');
}

pub fn patient_prompt(record: &PatientRecord, facts: &PatientFacts<'_>, token: RequestToken) -> String {
    let patient = &record.patient;
    let mut out = String::from(
        "Generate a concise medical summary of this patient based on the following data. \
         I need TWO separate sections:\n\n\
         1. Clinical Summary: Summarize the patient's profile, key conditions, medications, \
         and encounter history in 1-2 paragraphs.\n\n\
         2. Possible Issues: Identify any potential problems or gaps in care based on the data. \
         For example: untreated conditions, medication issues, concerning patterns in encounters, \
         or any other red flags. Be specific about what issues you see and why they're concerning.\n\n\
         IMPORTANT INSTRUCTIONS:\n\
         - DO NOT use the patient's name in your summary. Instead, refer to them as \"the patient\" \
         or \"this patient\".\n\
         - Use markdown formatting for emphasis (e.g., **bold** for important findings or _italics_ \
         for medical terms).\n\
         - Format lists with bullet points using markdown (* item) when appropriate.\n\
         - Keep your response well-structured and easy to read.\n",
    );
    let _ = writeln!(
        out,
        "- This is request #{token}. Generate a unique analysis.\n"
    );

    let _ = writeln!(out, "Patient ID: {}", inline(&patient.id));
    let _ = writeln!(out, "Age: {} years", facts.age);
    let _ = writeln!(out, "Gender: {}", inline(&patient.gender));
    let _ = writeln!(out, "Race: {}", inline(&patient.race));
    let _ = writeln!(out, "Ethnicity: {}\n", inline(&patient.ethnicity));

    let active: Vec<String> = facts.active_conditions.iter().map(|c| since_line(c)).collect();
    section(&mut out, "Active Conditions", &active);
    let all: Vec<String> = record.conditions.iter().map(range_line).collect();
    section(&mut out, "All Conditions", &all);

    let active: Vec<String> = facts.active_medications.iter().map(|m| since_line(m)).collect();
    section(&mut out, "Active Medications", &active);
    let all: Vec<String> = record.medications.iter().map(range_line).collect();
    section(&mut out, "All Medications", &all);

    let _ = writeln!(out, "Total Encounters: {}", record.encounters.len());
    out.push_str("Most Common Encounter Types:\n");
    for (description, count) in facts.top_encounter_types(TOP_ENCOUNTER_TYPES) {
        let _ = writeln!(out, "- {}: {count}", inline(description));
    }
    out.push_str("\nRecent Encounters:\n");
    for encounter in &facts.recent_encounters {
        let _ = writeln!(out, "- {}: {}", day(encounter.start), inline(&encounter.description));
    }

    out.push_str(
        "\nMake the summary concise but informative, highlighting the most clinically relevant details.\n\
         For the \"Possible Issues\" section, be analytical and focus on identifying potential gaps \
         in care, concerning patterns, or health risks.\n",
    );
    out
}

pub fn cluster_prompt(method: ClusterMethod, cluster_id: i32, facts: &ClusterFacts) -> String {
    let listing = |entries: &[String]| {
        if entries.is_empty() {
            "N/A".to_string()
        } else {
            entries.iter().map(|e| inline(e)).collect::<Vec<_>>().join(", ")
        }
    };

    format!(
        "Summarize the key characteristics of this patient cluster based on the following data. \
         Focus on demographics, common conditions, and medication patterns. \
         Keep the summary concise (2-3 sentences).\n\n\
         Clustering Method: {method}\n\
         Cluster ID: {cluster_id}\n\
         Number of Patients: {count}\n\
         Average Age: {age} years\n\
         Most Common Conditions (up to 5): {conditions}\n\
         Most Common Medications (up to 5): {medications}\n\n\
         Summary:\n",
        method = method.label(),
        count = facts.patient_count,
        age = facts.average_age,
        conditions = listing(&facts.common_conditions),
        medications = listing(&facts.common_medications),
    )
}
