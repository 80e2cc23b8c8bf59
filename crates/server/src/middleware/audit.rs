//! Audit logging for access to individual patient data

use axum::{body::Body, extract::Request, middleware::Next, response::Response};

use super::request_id::RequestId;

/// Paths that expose one patient's record or send patient data to the AI provider
fn is_audited(path: &str) -> bool {
    path.starts_with("/api/patients/") || path == "/api/summarize-cluster"
}

/// Middleware to log patient-data access for audit purposes
pub async fn audit_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().path().to_string();
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|r| r.0.clone())
        .unwrap_or_else(|| "unknown".to_string());

    // Run the request first to get the response status
    let response = next.run(request).await;

    if is_audited(&uri) {
        let status = response.status().as_u16();

        tracing::info!(
            target: "audit",
            request_id = %request_id,
            method = %method,
            path = %uri,
            status = %status,
            "Patient data access"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audits_record_and_summary_paths_only() {
        assert!(is_audited("/api/patients/1b2c"));
        assert!(is_audited("/api/patients/1b2c/summarize"));
        assert!(is_audited("/api/summarize-cluster"));
        assert!(!is_audited("/api/patients"));
        assert!(!is_audited("/api/clusters/3"));
        assert!(!is_audited("/health"));
    }
}
