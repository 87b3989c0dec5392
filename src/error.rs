//! Error types for the SenseAware engine

use thiserror::Error;

/// Errors that can occur outside the classification math, which is total
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid threshold table: {0}")]
    InvalidThresholds(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Failed to parse input: {0}")]
    ParseError(String),
}
