//! Recovery of the two summary sections from free-text model output
//!
//! Parsing is total. Whatever the model returns, the caller gets a summary
//! with two non-empty sections and the untouched original text.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub const NO_CLINICAL_SUMMARY: &str = "No clinical summary available";
pub const NO_ISSUES: &str = "No issues identified";

static SECTIONS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)clinical summary:(.*?)(?:possible issues:|$)(.*)").expect("valid regex")
});

/// `**` opening or closing any line
static BOLD_EDGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\*\*|\*\*$").expect("valid regex"));

/// A line holding nothing but a list number, e.g. `2.` or `**2.`
static DANGLING_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*(?:\*\*)?\d+\.?[ \t]*$").expect("valid regex"));

/// A bold list number trailing a line, e.g. `lupus. **2.`
static TRAILING_BOLD_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)[ \t]*\*\*\d+\.?[ \t]*$").expect("valid regex"));

/// A list number trailing a finished sentence, e.g. `lupus. 2.`
static TRAILING_LIST_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)([.!?:;])[ \t]+\d{1,2}\.[ \t]*$").expect("valid regex"));

static ISSUES_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)possible issues:[ \t]*").expect("valid regex"));

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StructuredSummary {
    pub clinical_summary: String,
    pub possible_issues: String,
    pub full_text: String,
}

pub fn parse_patient_summary(text: &str) -> StructuredSummary {
    let (clinical, issues) = match SECTIONS_RE.captures(text) {
        Some(caps) => (
            caps.get(1).map_or("", |m| m.as_str()),
            caps.get(2).map_or("", |m| m.as_str()),
        ),
        None => ("", ""),
    };

    let clinical = BOLD_EDGE_RE.replace_all(clinical.trim(), "");
    let clinical = DANGLING_NUMBER_RE.replace_all(&clinical, "");
    let clinical = TRAILING_BOLD_NUMBER_RE.replace_all(clinical.trim_end(), "");
    let clinical = TRAILING_LIST_NUMBER_RE.replace_all(&clinical, "$1");

    let issues = BOLD_EDGE_RE.replace_all(issues.trim(), "");
    let issues = ISSUES_HEADER_RE.replace_all(&issues, "");

    StructuredSummary {
        clinical_summary: or_placeholder(&clinical, NO_CLINICAL_SUMMARY),
        possible_issues: or_placeholder(&issues, NO_ISSUES),
        full_text: text.to_string(),
    }
}

fn or_placeholder(section: &str, placeholder: &str) -> String {
    let section = section.trim();
    if section.is_empty() {
        placeholder.to_string()
    } else {
        section.to_string()
    }
}
