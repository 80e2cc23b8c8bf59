//! Claude API client for the Anthropic Messages API

use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::{GenerationError, TextGenerator};
use crate::config::AiSettings;

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;
const RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// Client for the Anthropic Claude Messages API
#[derive(Clone)]
pub struct ClaudeClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
    max_retries: u32,
}

/// A message in the conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

/// Individual content block within a response
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

/// Request body for the Messages API
#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message>,
}

/// Response from the Messages API
#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    pub content: Vec<ContentBlock>,
}

/// Error detail from the Messages API
#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Statuses worth a second attempt: rate limited, unavailable, overloaded
fn is_transient_status(status: StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 503 | 529)
}

impl ClaudeClient {
    /// Create a client; fails only if the HTTP client cannot be built
    pub fn new(api_key: String, settings: &AiSettings) -> Result<Self, GenerationError> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| GenerationError::Failed(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self {
            http,
            api_key,
            model: settings.model.clone(),
            endpoint: format!("{}/v1/messages", settings.base_url.trim_end_matches('/')),
            max_retries: settings.max_retries,
        })
    }

    /// Send one prompt as a single user message, return the first text block
    async fn send_once(&self, prompt: &str) -> Result<String, GenerationError> {
        let request = ApiRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let response = self
            .http
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    GenerationError::Transient(format!("HTTP request failed: {}", e))
                } else {
                    GenerationError::Failed(format!("HTTP request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = match serde_json::from_str::<ApiError>(&body) {
                Ok(api_err) => api_err.error.message,
                Err(_) => body,
            };
            let message = format!("Claude API error ({}): {}", status, detail);
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    GenerationError::InvalidCredential(message)
                }
                s if is_transient_status(s) => GenerationError::Transient(message),
                _ => GenerationError::Failed(message),
            });
        }

        let response = response
            .json::<ApiResponse>()
            .await
            .map_err(|e| GenerationError::Failed(format!("Failed to parse response: {}", e)))?;
        extract_text(&response)
    }
}

/// Extract text content from an API response
fn extract_text(response: &ApiResponse) -> Result<String, GenerationError> {
    response
        .content
        .iter()
        .find_map(|block| match block {
            ContentBlock::Text { text } => Some(text.clone()),
            ContentBlock::Other => None,
        })
        .ok_or_else(|| GenerationError::Failed("No text content in response".to_string()))
}

impl TextGenerator for ClaudeClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let mut attempt = 0;
        loop {
            match self.send_once(prompt).await {
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    tracing::warn!(error = %e, attempt, "Retrying generation after transient failure");
                    tokio::time::sleep(RETRY_BACKOFF).await;
                }
                result => return result,
            }
        }
    }
}
