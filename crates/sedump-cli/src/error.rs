//! Error types for the sedump CLI
//!
//! Messages are user-facing and say what to check next.

use std::path::PathBuf;
use thiserror::Error;

use sedump_ingest::IngestError;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    /// Import pipeline failed
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// Query execution failed (SQLx)
    #[error("Database error: {0}. Check your database connection settings.")]
    Database(#[from] sqlx::Error),

    #[error("Scripts directory not found: '{}'. Pass --scripts-dir or run from the project root.", .0.display())]
    ScriptsDirNotFound(PathBuf),

    #[error("File operation failed on '{}': {source}. Check file permissions and disk space.", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize query results: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}. Check your environment variables or .env file.")]
    Config(String),
}

impl CliError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| CliError::Io { path, source }
    }
}

impl From<sedump_common::CommonError> for CliError {
    fn from(err: sedump_common::CommonError) -> Self {
        CliError::Config(err.to_string())
    }
}
