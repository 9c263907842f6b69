//! Error types for the counter application

use reidtrack::ReidError;
use thiserror::Error;

/// Result type alias for the counter application
pub type Result<T> = std::result::Result<T, CounterError>;

/// Errors that can occur while loading input or running the pipeline
#[derive(Error, Debug)]
pub enum CounterError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid input on line {line}: {message}")]
    InputError { line: usize, message: String },

    #[error("Tracking error: {0}")]
    TrackingError(#[from] ReidError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl CounterError {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn input<S: Into<String>>(line: usize, msg: S) -> Self {
        Self::InputError {
            line,
            message: msg.into(),
        }
    }
}
