//! Operational endpoints: liveness and Prometheus scrape

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use deadpool_postgres::Pool;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;

use crate::ai::ClaudeClient;

/// Health check response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    status: String,
    ai_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

/// GET /health - Check store connectivity and report whether summaries are available
pub async fn check(
    State(pool): State<Pool>,
    Extension(client): Extension<Option<ClaudeClient>>,
) -> impl IntoResponse {
    let ai_enabled = client.is_some();
    let unhealthy = |reason: String| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unhealthy".to_string(),
                ai_enabled,
                reason: Some(reason),
            }),
        )
    };

    match pool.get().await {
        Ok(client) => match client.query_one("SELECT 1", &[]).await {
            Ok(_) => (
                StatusCode::OK,
                Json(HealthResponse {
                    status: "healthy".to_string(),
                    ai_enabled,
                    reason: None,
                }),
            ),
            Err(e) => {
                tracing::error!(error = %e, "Health check query failed");
                unhealthy(format!("Database query failed: {}", e))
            }
        },
        Err(e) => {
            tracing::error!(error = %e, "Health check pool error");
            unhealthy(format!("Database connection failed: {}", e))
        }
    }
}

/// GET /metrics - Request and generation counters in Prometheus text format
pub async fn metrics(Extension(handle): Extension<PrometheusHandle>) -> String {
    handle.render()
}
