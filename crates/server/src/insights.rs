//! AI summaries of single patients and whole clusters
//!
//! Both operations are generic over the store and the generator so they can
//! run against in-memory doubles. Check order matters: validation and the
//! credential check happen before any store read, and nothing reaches the
//! generator unless the store had something to summarize.

use chrono::{DateTime, Utc};
use clinsight_core::{
    ClusterSummaryRequest, RequestToken, StructuredSummary, aggregate_cluster, aggregate_patient,
    cluster_prompt, parse_patient_summary, patient_prompt,
};

use crate::ai::{GenerationError, TextGenerator};
use crate::db::PatientStore;
use crate::error::AppError;

pub const MISSING_API_KEY: &str = "Server configuration error: Missing API Key.";
pub const INVALID_API_KEY: &str = "Invalid API Key or API error.";
pub const PATIENT_SUMMARY_FAILED: &str = "Failed to generate patient summary.";
pub const CLUSTER_SUMMARY_FAILED: &str = "Failed to generate cluster summary.";

/// Fixed reply for a cluster label nobody carries
pub fn empty_cluster_message(request: &ClusterSummaryRequest) -> String {
    format!(
        "No patients found for {} Cluster ID {}.",
        request.method.label(),
        request.cluster_id
    )
}

fn require_generator<G>(generator: Option<&G>) -> Result<&G, AppError> {
    generator.ok_or_else(|| {
        tracing::error!("ANTHROPIC_API_KEY is not set, refusing summary request");
        AppError::UpstreamConfig(MISSING_API_KEY.to_string())
    })
}

fn record_generation(kind: &'static str, outcome: &'static str) {
    metrics::counter!("insight_generations_total", "kind" => kind, "outcome" => outcome)
        .increment(1);
}

fn upstream_error(kind: &'static str, err: GenerationError, generic: &str) -> AppError {
    tracing::error!(kind, error = %err, "Summary generation failed");
    match err {
        GenerationError::InvalidCredential(_) => {
            record_generation(kind, "credential_error");
            AppError::UpstreamConfig(INVALID_API_KEY.to_string())
        }
        GenerationError::Transient(_) | GenerationError::Failed(_) => {
            record_generation(kind, "failure");
            AppError::UpstreamFailure(generic.to_string())
        }
    }
}

/// Summarize one patient into clinical narrative and possible issues.
pub async fn summarize_patient<S, G>(
    store: &S,
    generator: Option<&G>,
    patient_id: &str,
    now: DateTime<Utc>,
) -> Result<StructuredSummary, AppError>
where
    S: PatientStore,
    G: TextGenerator,
{
    let generator = require_generator(generator)?;

    let record = store
        .find_patient(patient_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Patient not found".to_string()))?;

    let facts = aggregate_patient(&record, now);
    let prompt = patient_prompt(&record, &facts, RequestToken::new(now));
    tracing::debug!(
        patient_id,
        active_conditions = facts.active_conditions.len(),
        active_medications = facts.active_medications.len(),
        "Built patient summary prompt"
    );

    let text = generator
        .generate(&prompt)
        .await
        .map_err(|e| upstream_error("patient", e, PATIENT_SUMMARY_FAILED))?;
    record_generation("patient", "ok");

    Ok(parse_patient_summary(&text))
}

/// Summarize the patients sharing one cluster label in a few sentences.
///
/// An empty cluster answers with [`empty_cluster_message`] and never calls the
/// generator.
pub async fn summarize_cluster<S, G>(
    store: &S,
    generator: Option<&G>,
    request: ClusterSummaryRequest,
    now: DateTime<Utc>,
) -> Result<String, AppError>
where
    S: PatientStore,
    G: TextGenerator,
{
    let generator = require_generator(generator)?;

    let members = store
        .find_cluster_members(request.method, request.cluster_id)
        .await?;
    let Some(facts) = aggregate_cluster(&members, now) else {
        tracing::info!(
            method = %request.method,
            cluster_id = request.cluster_id,
            "Cluster has no patients, skipping generation"
        );
        return Ok(empty_cluster_message(&request));
    };

    let prompt = cluster_prompt(request.method, request.cluster_id, &facts);
    let text = generator
        .generate(&prompt)
        .await
        .map_err(|e| upstream_error("cluster", e, CLUSTER_SUMMARY_FAILED))?;
    record_generation("cluster", "ok");

    Ok(text)
}
