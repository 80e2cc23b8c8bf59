//! Application error handling

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use clinsight_core::{ErrorBody, InsightError};

/// Application error type
#[derive(Debug, PartialEq, Eq)]
pub enum AppError {
    NotFound(String),
    Validation(String),
    /// Generative API key missing or rejected
    UpstreamConfig(String),
    /// Generative call failed for any other reason
    UpstreamFailure(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::UpstreamConfig(msg) | AppError::UpstreamFailure(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody::new(message))).into_response()
    }
}

impl From<InsightError> for AppError {
    fn from(err: InsightError) -> Self {
        match err {
            InsightError::NotFound(msg) => AppError::NotFound(msg),
            InsightError::Validation(msg) => AppError::Validation(msg),
        }
    }
}

impl From<deadpool_postgres::PoolError> for AppError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        AppError::Internal(format!("Database pool error: {}", err))
    }
}

impl From<tokio_postgres::Error> for AppError {
    fn from(err: tokio_postgres::Error) -> Self {
        AppError::Internal(format!("Database error: {}", err))
    }
}
