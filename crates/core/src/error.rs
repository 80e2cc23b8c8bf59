use thiserror::Error;

/// Failures raised by the pure summarization pipeline
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InsightError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),
}
