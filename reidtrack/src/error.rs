//! Error types for the tracking and re-identification library

use thiserror::Error;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, ReidError>;

/// Errors that can occur while tracking or resolving identities
#[derive(Error, Debug)]
pub enum ReidError {
    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    #[error("Tracklet {0} has no frames")]
    EmptyHistory(u32),

    #[error("Session {0} has no stored vectors")]
    EmptySession(String),

    #[error("Illegal state transition: {from} -> {to}")]
    IllegalTransition { from: String, to: String },

    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Corrupt session counter file: {0}")]
    CorruptCounter(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ReidError {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn transition<A: std::fmt::Debug, B: std::fmt::Debug>(from: A, to: B) -> Self {
        Self::IllegalTransition {
            from: format!("{:?}", from),
            to: format!("{:?}", to),
        }
    }
}
