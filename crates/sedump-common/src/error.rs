//! Error types shared across the workspace

use thiserror::Error;

/// Result type alias for common helpers
pub type Result<T> = std::result::Result<T, CommonError>;

/// Errors raised while reading configuration from the environment
#[derive(Error, Debug)]
pub enum CommonError {
    #[error("Invalid value for {key}: '{value}' ({reason})")]
    InvalidEnv {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CommonError {
    /// Create an invalid environment value error
    pub fn invalid_env(key: &str, value: &str, reason: impl ToString) -> Self {
        Self::InvalidEnv {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
