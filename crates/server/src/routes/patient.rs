//! Patient directory and record handlers

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use deadpool_postgres::Pool;

use crate::db::{PatientRepository, PatientStore};
use crate::error::AppError;

/// GET /api/patients - Directory of every patient, ordered by id
pub async fn list(State(pool): State<Pool>) -> Result<impl IntoResponse, AppError> {
    let repo = PatientRepository::new(pool);
    let patients = repo.list_patients().await?;
    Ok(Json(patients))
}

/// GET /api/patients/{id} - Full record with conditions, medications and encounters
pub async fn read(
    State(pool): State<Pool>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let repo = PatientRepository::new(pool);

    match repo.find_patient(&id).await? {
        Some(record) => Ok(Json(record)),
        None => Err(AppError::NotFound("Patient not found".to_string())),
    }
}
