//! Reduction of raw records into the statistics fed to the prompt builder

mod cluster;
mod patient;

pub use cluster::{ClusterFacts, TOP_N, aggregate_cluster};
pub use patient::{PatientFacts, RECENT_ENCOUNTERS, aggregate_patient};

use chrono::{Datelike, NaiveDate};

/// Age in whole calendar years on `today`.
///
/// The year difference is reduced by one until the birthday has been reached
/// in the current year.
pub fn calendar_age(birthdate: NaiveDate, today: NaiveDate) -> i32 {
    let years = today.year() - birthdate.year();
    if (today.month(), today.day()) < (birthdate.month(), birthdate.day()) {
        years - 1
    } else {
        years
    }
}
