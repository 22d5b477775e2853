//! Error types for yomi core.

use thiserror::Error;

/// Result type alias for yomi operations.
pub type Result<T> = std::result::Result<T, YomiError>;

/// Errors that can occur at the engine boundary.
#[derive(Error, Debug)]
pub enum YomiError {
    /// Model loading or lookup error.
    #[error("model error: {0}")]
    Model(String),

    /// Inference session could not be created.
    #[error("session error: {0}")]
    Session(String),

    /// An engine decode step failed.
    #[error("step error: {0}")]
    Step(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration (de)serialization error.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}
