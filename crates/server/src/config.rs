//! Server configuration

use std::time::Duration;

use crate::ai::client::{DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Server configuration loaded from environment variables
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    /// Enables `X-API-Key` authentication on `/api` when set
    pub api_key: Option<String>,
    pub cors_origins: Vec<String>,
    /// Requests per second allowed on the AI summary endpoints
    pub rate_limit_rps: u32,
    pub anthropic_api_key: Option<String>,
    pub ai: AiSettings,
}

/// Generative API client settings
#[derive(Debug, Clone)]
pub struct AiSettings {
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
    /// Retries on transient failures only
    pub max_retries: u32,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 1,
        }
    }
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env_opt(key) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Ignoring unparsable configuration value");
            default
        }),
        None => default,
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = AiSettings::default();
        Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "host=localhost user=postgres dbname=clinsight".into()),
            bind_address: std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            api_key: env_opt("API_KEY"),
            cors_origins: env_opt("CORS_ORIGINS")
                .map(|v| v.split(',').map(|o| o.trim().to_string()).collect())
                .unwrap_or_else(|| vec!["*".to_string()]),
            rate_limit_rps: env_parse("RATE_LIMIT_RPS", 10),
            anthropic_api_key: env_opt("ANTHROPIC_API_KEY"),
            ai: AiSettings {
                model: env_opt("ANTHROPIC_MODEL").unwrap_or(defaults.model),
                base_url: env_opt("ANTHROPIC_BASE_URL").unwrap_or(defaults.base_url),
                timeout: Duration::from_secs(env_parse(
                    "AI_TIMEOUT_SECS",
                    defaults.timeout.as_secs(),
                )),
                max_retries: env_parse("AI_MAX_RETRIES", defaults.max_retries),
            },
        }
    }
}
