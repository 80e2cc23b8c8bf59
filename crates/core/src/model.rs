use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::InsightError;

/// Which offline clustering run a label belongs to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClusterMethod {
    #[default]
    Kmeans,
    Dbscan,
}

impl ClusterMethod {
    /// Upper-case label used in prompts and user-facing messages
    pub fn label(self) -> &'static str {
        match self {
            ClusterMethod::Kmeans => "KMEANS",
            ClusterMethod::Dbscan => "DBSCAN",
        }
    }

    /// Patient table column holding this partition's label
    pub fn column(self) -> &'static str {
        match self {
            ClusterMethod::Kmeans => "kmeans_cluster",
            ClusterMethod::Dbscan => "dbscan_cluster",
        }
    }
}

impl fmt::Display for ClusterMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClusterMethod::Kmeans => write!(f, "kmeans"),
            ClusterMethod::Dbscan => write!(f, "dbscan"),
        }
    }
}

impl FromStr for ClusterMethod {
    type Err = InsightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kmeans" => Ok(ClusterMethod::Kmeans),
            "dbscan" => Ok(ClusterMethod::Dbscan),
            _ => Err(InsightError::Validation(
                "Invalid clusterType. Must be \"kmeans\" or \"dbscan\".".to_string(),
            )),
        }
    }
}

/// Patient demographics and cluster labels
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: String,
    pub birthdate: NaiveDate,
    pub deathdate: Option<NaiveDate>,
    pub first: String,
    pub last: String,
    pub gender: String,
    pub race: String,
    pub ethnicity: String,
    #[serde(rename = "clusterId")]
    pub kmeans_cluster: Option<i32>,
    #[serde(rename = "dbscanClusterId")]
    pub dbscan_cluster: Option<i32>,
}

impl Patient {
    /// Label of this patient in the given partition, if clustered
    pub fn cluster(&self, method: ClusterMethod) -> Option<i32> {
        match method {
            ClusterMethod::Kmeans => self.kmeans_cluster,
            ClusterMethod::Dbscan => self.dbscan_cluster,
        }
    }
}

/// A coded clinical episode with a start and an optional stop.
///
/// Conditions and medications share this shape. Whether an episode is active
/// is never stored; it depends on the instant it is evaluated at.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub code: String,
    pub description: String,
    pub start: DateTime<Utc>,
    pub stop: Option<DateTime<Utc>>,
}

pub type Condition = Episode;
pub type Medication = Episode;

impl Episode {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        match self.stop {
            None => true,
            Some(stop) => stop > now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Encounter {
    pub code: String,
    pub description: String,
    pub reason_code: Option<String>,
    pub start: DateTime<Utc>,
}

/// A patient together with every record it owns
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    #[serde(flatten)]
    pub patient: Patient,
    pub conditions: Vec<Condition>,
    pub medications: Vec<Medication>,
    pub encounters: Vec<Encounter>,
}

/// Minimal projection of a patient used for cluster statistics
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterMember {
    pub id: String,
    pub birthdate: NaiveDate,
    pub conditions: Vec<String>,
    pub medications: Vec<String>,
}

/// Number of patients carrying one label
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterCount {
    pub cluster_id: i32,
    pub patient_count: i64,
}

/// Directory row for patient listings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatientListing {
    pub id: String,
    pub first: String,
    pub last: String,
    pub birthdate: NaiveDate,
    pub gender: String,
    #[serde(rename = "clusterId")]
    pub kmeans_cluster: Option<i32>,
    #[serde(rename = "dbscanClusterId")]
    pub dbscan_cluster: Option<i32>,
    pub condition_count: i64,
    pub medication_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn episode(stop: Option<DateTime<Utc>>) -> Episode {
        Episode {
            code: "200936003".to_string(),
            description: "Lupus".to_string(),
            start: at(2020, 1, 1),
            stop,
        }
    }

    #[test]
    fn open_episode_is_active_at_any_instant() {
        let e = episode(None);
        assert!(e.is_active(at(1900, 1, 1)));
        assert!(e.is_active(at(2024, 1, 1)));
        assert!(e.is_active(at(2999, 12, 31)));
    }

    #[test]
    fn stopped_episode_is_active_only_before_stop() {
        let stop = at(2024, 1, 1);
        let e = episode(Some(stop));
        assert!(e.is_active(at(2023, 12, 31)));
        // a stop equal to now is no longer active
        assert!(!e.is_active(stop));
        assert!(!e.is_active(at(2024, 1, 2)));
    }

    #[test]
    fn cluster_method_parses_known_values_only() {
        assert_eq!("kmeans".parse::<ClusterMethod>().unwrap(), ClusterMethod::Kmeans);
        assert_eq!("dbscan".parse::<ClusterMethod>().unwrap(), ClusterMethod::Dbscan);
        assert!(matches!(
            "KMEANS".parse::<ClusterMethod>(),
            Err(InsightError::Validation(_))
        ));
        assert_eq!(ClusterMethod::Dbscan.label(), "DBSCAN");
        assert_eq!(ClusterMethod::Dbscan.column(), "dbscan_cluster");
    }

    #[test]
    fn patient_serializes_with_dashboard_keys() {
        let patient = Patient {
            id: "p1".to_string(),
            birthdate: NaiveDate::from_ymd_opt(1990, 6, 15).unwrap(),
            deathdate: None,
            first: "Ana".to_string(),
            last: "Lopez".to_string(),
            gender: "F".to_string(),
            race: "white".to_string(),
            ethnicity: "hispanic".to_string(),
            kmeans_cluster: Some(1),
            dbscan_cluster: None,
        };
        let json = serde_json::to_value(&patient).unwrap();
        assert_eq!(json["clusterId"], 1);
        assert!(json["dbscanClusterId"].is_null());
        assert_eq!(json["birthdate"], "1990-06-15");
    }
}
