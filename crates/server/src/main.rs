//! clinsight-server: clinical dashboard API binary entrypoint.

use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clinsight_server::config::Config;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = Config::from_env();

    let pool =
        clinsight_server::db::create_pool(&config.database_url).expect("Failed to create database pool");

    if let Err(e) = clinsight_server::db::apply_schema(&pool).await {
        tracing::warn!(error = ?e, "Could not apply store schema, continuing with existing tables");
    }

    if config.api_key.is_some() {
        tracing::info!("API key authentication enabled");
    } else {
        tracing::warn!("API key authentication disabled (no API_KEY env var)");
    }
    if config.anthropic_api_key.is_some() {
        tracing::info!(
            model = %config.ai.model,
            timeout_secs = config.ai.timeout.as_secs(),
            max_retries = config.ai.max_retries,
            "Anthropic API key configured, AI summaries enabled"
        );
    } else {
        tracing::warn!("ANTHROPIC_API_KEY not set, AI summaries disabled");
    }
    tracing::info!("Summary rate limit: {} requests/second", config.rate_limit_rps);

    let app = clinsight_server::build_app(pool, &config);

    let addr: SocketAddr = config.bind_address.parse().expect("Invalid bind address");
    tracing::info!("Starting clinsight server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Server shutdown complete");
}

/// Resolves on Ctrl+C, or SIGTERM on unix
async fn shutdown_signal() {
    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    let signal = tokio::select! {
        _ = tokio::signal::ctrl_c() => "SIGINT",
        _ = sigterm => "SIGTERM",
    };
    tracing::info!(signal, "Draining in-flight requests");
}
