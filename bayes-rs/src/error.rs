//! Error types for bayes-rs

use thiserror::Error;

/// Result type alias for classifier operations
pub type Result<T> = std::result::Result<T, BayesError>;

/// Classifier error types
#[derive(Error, Debug)]
pub enum BayesError {
    /// Unlearn of a sample that was never learned (or already unlearned)
    #[error("Precondition violated: {0}")]
    Precondition(String),

    /// Class has no learned samples
    #[error("Unknown class: {0}")]
    UnknownClass(String),

    /// Text produced no tokens
    #[error("Input text produced no tokens")]
    EmptyInput,

    /// No classes have been learned yet
    #[error("Classifier has not learned any class")]
    EmptyModel,

    /// Snapshot could not be decoded or is inconsistent
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
