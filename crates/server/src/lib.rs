//! clinsight-server library crate
//!
//! Exposes `build_app`, configuration, the store and generator seams, and the
//! summary service for integration tests. The binary entrypoint is in
//! `main.rs`.

pub mod ai;
pub mod config;
pub mod db;
pub mod error;
pub mod insights;
mod middleware;
mod routes;

use axum::{Extension, Router, middleware as axum_mw, routing::get};
use deadpool_postgres::Pool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use middleware::ApiKeyAuth;

/// Build the full application router with all routes and middleware.
///
/// Extracted from `main()` so integration tests can construct the app
/// without binding to a TCP port.
pub fn build_app(pool: Pool, config: &Config) -> Router {
    let auth = ApiKeyAuth::new(config.api_key.clone());

    // Only the summary routes spend generative API budget
    let rate_limiter = middleware::create_rate_limiter(config.rate_limit_rps);

    // Claude client (None if ANTHROPIC_API_KEY not set)
    let claude_client: Option<ai::ClaudeClient> =
        config
            .anthropic_api_key
            .as_ref()
            .and_then(|key| match ai::ClaudeClient::new(key.clone(), &config.ai) {
                Ok(client) => Some(client),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to build Claude client, AI features disabled");
                    None
                }
            });

    let insight_routes = routes::insight_routes()
        .layer(axum_mw::from_fn(middleware::rate_limit_middleware))
        .layer(Extension(rate_limiter));

    // Protected routes (require auth when an API key is configured)
    let api_routes = Router::new()
        .merge(routes::data_routes())
        .merge(insight_routes)
        .layer(axum_mw::from_fn(middleware::auth_middleware))
        .layer(Extension(auth));

    // Install Prometheus metrics recorder.
    // Repeated installs (e.g. in integration tests) are ignored; the handle
    // from this build still renders.
    let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
    let prometheus_handle = recorder.handle();
    let _ = metrics::set_global_recorder(recorder);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(routes::health::check))
        .route("/metrics", get(routes::health::metrics))
        .layer(Extension(prometheus_handle));

    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .merge(public_routes)
        .nest("/api", api_routes)
        .layer(Extension(claude_client))
        .with_state(pool)
        .layer(axum_mw::from_fn(middleware::audit_middleware))
        .layer(axum_mw::from_fn(middleware::request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum_mw::from_fn(middleware::metrics_middleware))
}
