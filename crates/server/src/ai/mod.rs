//! Generative text gateway

pub mod client;

pub use client::ClaudeClient;

use std::future::Future;

use thiserror::Error;

/// Failure of a single generation call
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    /// The API key was rejected
    #[error("invalid API credential: {0}")]
    InvalidCredential(String),

    /// Timeouts, dropped connections and overload responses; safe to retry
    #[error("transient generation failure: {0}")]
    Transient(String),

    #[error("generation failed: {0}")]
    Failed(String),
}

impl GenerationError {
    pub fn is_transient(&self) -> bool {
        matches!(self, GenerationError::Transient(_))
    }
}

/// A text-completion backend: one prompt in, unstructured text out
pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String, GenerationError>> + Send;
}
