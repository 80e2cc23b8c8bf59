//! clinsight-core: domain types and the summarization pipeline
//!
//! Everything here is pure. Records come in already loaded, "now" is passed
//! explicitly, and the generative model is reached only by the server crate.

pub mod aggregate;
pub mod error;
pub mod model;
pub mod outcome;
pub mod prompt;
pub mod request;
pub mod summary;

pub use aggregate::{
    ClusterFacts, PatientFacts, aggregate_cluster, aggregate_patient, calendar_age,
};
pub use error::InsightError;
pub use model::{
    ClusterCount, ClusterMember, ClusterMethod, Condition, Encounter, Episode, Medication,
    Patient, PatientListing, PatientRecord,
};
pub use outcome::ErrorBody;
pub use prompt::{RequestToken, cluster_prompt, patient_prompt};
pub use request::{ClusterSummaryRequest, parse_cluster_id};
pub use summary::{StructuredSummary, parse_patient_summary};
