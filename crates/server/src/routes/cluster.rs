//! Cluster browsing handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use deadpool_postgres::Pool;

use clinsight_core::parse_cluster_id;

use super::MethodQuery;
use crate::db::{PatientRepository, PatientStore};
use crate::error::AppError;

/// GET /api/clusters - Patient count per label of one partition
pub async fn counts(
    State(pool): State<Pool>,
    Query(query): Query<MethodQuery>,
) -> Result<impl IntoResponse, AppError> {
    let method = query.method()?;
    let repo = PatientRepository::new(pool);
    Ok(Json(repo.cluster_counts(method).await?))
}

/// GET /api/clusters/{cluster_id} - Patients carrying one label
pub async fn patients(
    State(pool): State<Pool>,
    Path(cluster_id): Path<String>,
    Query(query): Query<MethodQuery>,
) -> Result<impl IntoResponse, AppError> {
    let cluster_id = parse_cluster_id(&cluster_id)?;
    let method = query.method()?;
    let repo = PatientRepository::new(pool);
    Ok(Json(repo.list_cluster_patients(method, cluster_id).await?))
}
