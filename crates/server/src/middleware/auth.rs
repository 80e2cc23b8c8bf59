use axum::{
    Json,
    body::Body,
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use clinsight_core::ErrorBody;

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "X-API-Key";

/// API Key authentication state
#[derive(Clone)]
pub struct ApiKeyAuth {
    api_key: Option<String>,
}

impl ApiKeyAuth {
    pub fn new(api_key: Option<String>) -> Self {
        Self { api_key }
    }

    /// Whether a presented key grants access; everything passes when no key is configured
    fn allows(&self, presented: Option<&str>) -> bool {
        match &self.api_key {
            None => true,
            Some(expected) => presented == Some(expected.as_str()),
        }
    }
}

/// Reject `/api` requests that do not carry the configured API key
pub async fn auth_middleware(request: Request<Body>, next: Next) -> Response {
    let auth = request.extensions().get::<ApiKeyAuth>().cloned();
    let presented = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    if let Some(auth) = auth {
        if !auth.allows(presented) {
            tracing::warn!(path = %request.uri().path(), "Rejected request with missing or invalid API key");
            return (
                StatusCode::UNAUTHORIZED,
                Json(ErrorBody::new("Missing or invalid API key")),
            )
                .into_response();
        }
    }

    next.run(request).await
}
