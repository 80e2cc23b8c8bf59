mod cluster;
pub mod health;
mod insights;
mod patient;

use axum::{
    Router,
    routing::{get, post},
};
use deadpool_postgres::Pool;
use serde::Deserialize;

use clinsight_core::ClusterMethod;

use crate::error::AppError;

/// `?method=kmeans|dbscan`, K-Means when absent
#[derive(Debug, Deserialize, Default)]
pub struct MethodQuery {
    pub method: Option<String>,
}

impl MethodQuery {
    fn method(&self) -> Result<ClusterMethod, AppError> {
        match self.method.as_deref() {
            None | Some("") => Ok(ClusterMethod::default()),
            Some(raw) => Ok(raw.parse()?),
        }
    }
}

/// Build patient and cluster browsing routes
pub fn data_routes() -> Router<Pool> {
    Router::new()
        .route("/patients", get(patient::list))
        .route("/patients/{id}", get(patient::read))
        .route("/clusters", get(cluster::counts))
        .route("/clusters/{cluster_id}", get(cluster::patients))
}

/// Build the AI summary routes
pub fn insight_routes() -> Router<Pool> {
    Router::new()
        .route("/patients/{id}/summarize", get(insights::summarize_patient))
        .route("/summarize-cluster", post(insights::summarize_cluster))
}
