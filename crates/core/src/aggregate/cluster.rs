use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::calendar_age;
use crate::model::ClusterMember;

/// Length of the common condition/medication lists
pub const TOP_N: usize = 5;

/// Derived statistics for every patient sharing one cluster label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterFacts {
    pub patient_count: usize,
    pub average_age: i64,
    pub common_conditions: Vec<String>,
    pub common_medications: Vec<String>,
}

/// Aggregate a cluster, or `None` when it has no members.
///
/// An empty cluster is not an error, but there is nothing to summarize, so
/// callers answer with a fixed message instead of prompting.
pub fn aggregate_cluster(members: &[ClusterMember], now: DateTime<Utc>) -> Option<ClusterFacts> {
    if members.is_empty() {
        return None;
    }

    let today = now.date_naive();
    let patient_count = members.len();
    let total_age: i64 = members
        .iter()
        .map(|m| i64::from(calendar_age(m.birthdate, today)))
        .sum();
    // f64::round rounds half away from zero
    let average_age = (total_age as f64 / patient_count as f64).round() as i64;

    let common_conditions = most_common(members.iter().flat_map(|m| m.conditions.iter()));
    let common_medications = most_common(members.iter().flat_map(|m| m.medications.iter()));

    Some(ClusterFacts {
        patient_count,
        average_age,
        common_conditions,
        common_medications,
    })
}

/// Tally descriptions and render the top entries as `"<description> (<n> patients)"`.
///
/// Counts tie in first-seen order.
fn most_common<'a>(descriptions: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut tally: Vec<(&str, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for description in descriptions {
        let description = description.as_str();
        if description.is_empty() {
            continue;
        }
        match index.get(description) {
            Some(&slot) => tally[slot].1 += 1,
            None => {
                index.insert(description, tally.len());
                tally.push((description, 1));
            }
        }
    }

    tally.sort_by(|a, b| b.1.cmp(&a.1));
    tally
        .into_iter()
        .take(TOP_N)
        .map(|(description, count)| format!("{description} ({count} patients)"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn member(id: &str, birth: (i32, u32, u32), conditions: &[&str], medications: &[&str]) -> ClusterMember {
        ClusterMember {
            id: id.to_string(),
            birthdate: NaiveDate::from_ymd_opt(birth.0, birth.1, birth.2).unwrap(),
            conditions: conditions.iter().map(|s| s.to_string()).collect(),
            medications: medications.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn count_of(entry: &str) -> usize {
        let open = entry.rfind('(').unwrap();
        entry[open + 1..].split(' ').next().unwrap().parse().unwrap()
    }

    #[test]
    fn empty_cluster_has_no_facts() {
        assert_eq!(aggregate_cluster(&[], now()), None);
    }

    #[test]
    fn lupus_cluster_ranks_by_occurrence() {
        let members = vec![
            member("a", (1990, 6, 15), &["Lupus"], &[]),
            member("b", (1980, 1, 1), &["Lupus"], &[]),
            member("c", (1970, 1, 1), &["RA"], &[]),
        ];

        let facts = aggregate_cluster(&members, now()).unwrap();

        assert_eq!(facts.patient_count, 3);
        assert_eq!(
            facts.common_conditions,
            vec!["Lupus (2 patients)".to_string(), "RA (1 patients)".to_string()]
        );
        assert!(facts.common_medications.is_empty());
    }

    #[test]
    fn average_age_rounds_half_up() {
        // ages 33 and 44 -> 38.5
        let members = vec![
            member("a", (1990, 6, 15), &[], &[]),
            member("b", (1979, 6, 15), &[], &[]),
        ];
        assert_eq!(aggregate_cluster(&members, now()).unwrap().average_age, 39);

        // ages 33, 34, 34 -> 33.67
        let members = vec![
            member("a", (1990, 6, 15), &[], &[]),
            member("b", (1989, 6, 15), &[], &[]),
            member("c", (1989, 6, 15), &[], &[]),
        ];
        assert_eq!(aggregate_cluster(&members, now()).unwrap().average_age, 34);

        // ages 33, 33, 34 -> 33.33
        let members = vec![
            member("a", (1990, 6, 15), &[], &[]),
            member("b", (1990, 6, 15), &[], &[]),
            member("c", (1989, 6, 15), &[], &[]),
        ];
        assert_eq!(aggregate_cluster(&members, now()).unwrap().average_age, 33);
    }

    #[test]
    fn top_lists_are_capped_and_non_increasing() {
        let members = vec![
            member("a", (1990, 1, 1), &["A", "B", "C", "D", "E", "F", "G"], &["m1", "m2"]),
            member("b", (1990, 1, 1), &["G", "F", "E", "D"], &["m2"]),
            member("c", (1990, 1, 1), &["G", "F"], &["m2", "m3"]),
            member("d", (1990, 1, 1), &["G"], &[]),
        ];

        let facts = aggregate_cluster(&members, now()).unwrap();

        assert_eq!(facts.common_conditions.len(), TOP_N);
        let counts: Vec<usize> = facts.common_conditions.iter().map(|e| count_of(e)).collect();
        assert!(counts.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(facts.common_conditions[0], "G (4 patients)");
        assert_eq!(facts.common_medications[0], "m2 (3 patients)");
        assert_eq!(facts.common_medications.len(), 3);
    }

    #[test]
    fn ties_keep_first_seen_order_and_empty_descriptions_are_skipped() {
        let members = vec![
            member("a", (1990, 1, 1), &["Sinusitis", "", "Asthma"], &[]),
            member("b", (1990, 1, 1), &["Asthma", "  ", "Sinusitis"], &[]),
        ];

        let facts = aggregate_cluster(&members, now()).unwrap();

        assert_eq!(
            facts.common_conditions,
            vec![
                "Sinusitis (2 patients)".to_string(),
                "Asthma (2 patients)".to_string(),
                "   (1 patients)".to_string(),
            ]
        );
    }
}
