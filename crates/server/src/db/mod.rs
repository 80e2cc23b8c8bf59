mod repository;

pub use repository::PatientRepository;

use std::future::Future;

use clinsight_core::{ClusterCount, ClusterMember, ClusterMethod, PatientListing, PatientRecord};
use deadpool_postgres::{Config, Pool, Runtime};
use tokio_postgres::NoTls;

use crate::error::AppError;

/// Idempotent DDL for the patient store
pub const SCHEMA: &str = include_str!("../../sql/schema.sql");

/// Create a connection pool from a database URL
pub fn create_pool(database_url: &str) -> Result<Pool, deadpool_postgres::CreatePoolError> {
    let mut cfg = Config::new();
    cfg.url = Some(database_url.to_string());
    cfg.create_pool(Some(Runtime::Tokio1), NoTls)
}

/// Create the store tables if they do not exist yet
pub async fn apply_schema(pool: &Pool) -> Result<(), AppError> {
    let client = pool.get().await?;
    client.batch_execute(SCHEMA).await?;
    Ok(())
}

/// Read access to patients and their cluster labels
pub trait PatientStore: Send + Sync {
    /// A patient with conditions, medications and encounters
    fn find_patient(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<PatientRecord>, AppError>> + Send;

    /// Every patient labeled `cluster_id` in the given partition
    fn find_cluster_members(
        &self,
        method: ClusterMethod,
        cluster_id: i32,
    ) -> impl Future<Output = Result<Vec<ClusterMember>, AppError>> + Send;

    /// Patient count per label, unlabeled patients excluded
    fn cluster_counts(
        &self,
        method: ClusterMethod,
    ) -> impl Future<Output = Result<Vec<ClusterCount>, AppError>> + Send;

    fn list_patients(&self) -> impl Future<Output = Result<Vec<PatientListing>, AppError>> + Send;

    fn list_cluster_patients(
        &self,
        method: ClusterMethod,
        cluster_id: i32,
    ) -> impl Future<Output = Result<Vec<PatientListing>, AppError>> + Send;
}
