//! AI summary endpoints

use axum::{
    Extension, Json,
    body::Bytes,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::Utc;
use deadpool_postgres::Pool;
use serde::Serialize;

use clinsight_core::{ClusterSummaryRequest, StructuredSummary};

use crate::ai::ClaudeClient;
use crate::db::PatientRepository;
use crate::error::AppError;

#[derive(Serialize)]
pub struct PatientSummaryResponse {
    summary: StructuredSummary,
}

#[derive(Serialize)]
pub struct ClusterSummaryResponse {
    summary: String,
}

/// GET /api/patients/{id}/summarize - Clinical summary and possible issues
pub async fn summarize_patient(
    State(pool): State<Pool>,
    Extension(client): Extension<Option<ClaudeClient>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!(patient_id = %id, "Patient summary requested");

    let repo = PatientRepository::new(pool);
    let summary =
        crate::insights::summarize_patient(&repo, client.as_ref(), &id, Utc::now()).await?;

    Ok(Json(PatientSummaryResponse { summary }))
}

/// POST /api/summarize-cluster - Short description of one cluster
///
/// The body is parsed by hand so malformed JSON is reported with the same
/// error shape as every other validation failure.
pub async fn summarize_cluster(
    State(pool): State<Pool>,
    Extension(client): Extension<Option<ClaudeClient>>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let request = ClusterSummaryRequest::from_json(&body)?;
    tracing::info!(
        method = %request.method,
        cluster_id = request.cluster_id,
        "Cluster summary requested"
    );

    let repo = PatientRepository::new(pool);
    let summary =
        crate::insights::summarize_cluster(&repo, client.as_ref(), request, Utc::now()).await?;

    Ok(Json(ClusterSummaryResponse { summary }))
}
