//! Validation of caller-supplied cluster selections

use serde_json::Value as JsonValue;

use crate::error::InsightError;
use crate::model::ClusterMethod;

/// A validated request to summarize one cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterSummaryRequest {
    pub cluster_id: i32,
    pub method: ClusterMethod,
}

impl ClusterSummaryRequest {
    /// Validate a raw JSON body of the shape `{"clusterId": 2, "clusterType": "dbscan"}`.
    ///
    /// `clusterType` defaults to K-Means when absent, null, `false`, `0` or `""`.
    pub fn from_json(body: &[u8]) -> Result<Self, InsightError> {
        let body: JsonValue = serde_json::from_slice(body).map_err(|_| {
            InsightError::Validation("Invalid request body. Could not parse JSON.".to_string())
        })?;

        let cluster_id = body
            .get("clusterId")
            .and_then(JsonValue::as_i64)
            .and_then(|id| i32::try_from(id).ok())
            .ok_or_else(|| {
                InsightError::Validation(
                    "Invalid clusterId provided. Must be a number.".to_string(),
                )
            })?;

        let method = match body.get("clusterType") {
            Some(value) if !is_unset(value) => value.as_str().unwrap_or_default().parse()?,
            _ => ClusterMethod::default(),
        };

        Ok(Self { cluster_id, method })
    }
}

/// Falsy JSON values count as an omitted field
fn is_unset(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => true,
        JsonValue::Bool(b) => !b,
        JsonValue::Number(n) => n.as_f64() == Some(0.0),
        JsonValue::String(s) => s.is_empty(),
        JsonValue::Array(_) | JsonValue::Object(_) => false,
    }
}

/// Parse a cluster label taken from a URL path segment
pub fn parse_cluster_id(raw: &str) -> Result<i32, InsightError> {
    raw.trim()
        .parse()
        .map_err(|_| InsightError::Validation("Invalid cluster ID".to_string()))
}
