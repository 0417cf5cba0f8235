//! Ingestion error types
//!
//! Every failure except a missing entity file is fatal for the data source
//! being imported. Callers decide what to do with the first fatal error.

use std::path::PathBuf;
use thiserror::Error;

use crate::coerce::CoercionError;
use crate::decoder::DecodeError;
use crate::entities::EntityKind;

/// Result type alias for ingestion operations
pub type IngestResult<T> = std::result::Result<T, IngestError>;

/// Ingestion error taxonomy
#[derive(Error, Debug)]
pub enum IngestError {
    /// The XML stream of a source file is malformed
    #[error("Malformed XML in '{}': {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },

    /// A required field of a record could not be converted
    #[error(
        "Invalid {entity} record #{record} (Id {id}): {source}",
        id = .id.as_deref().unwrap_or("?")
    )]
    Coercion {
        entity: EntityKind,
        record: u64,
        id: Option<String>,
        #[source]
        source: CoercionError,
    },

    /// Statement preparation or execution failed while loading an entity
    #[error("Database error while loading {entity}: {source}")]
    Store {
        entity: EntityKind,
        #[source]
        source: sqlx::Error,
    },

    /// The external archive tool failed
    #[error(
        "Failed to extract '{}' (exit code {code}): {output}",
        archive.display(),
        code = .exit_code.map(|c| c.to_string()).unwrap_or_else(|| "none".to_string())
    )]
    Extraction {
        archive: PathBuf,
        exit_code: Option<i32>,
        output: String,
    },

    /// No source file matches an entity type; the only recoverable error
    #[error("No {entity} file found in '{}'", dir.display())]
    NotFound { entity: String, dir: PathBuf },

    /// A corrective update of the referential repair pass failed
    #[error("Referential repair failed at {stage}: {source}")]
    Repair {
        stage: String,
        #[source]
        source: sqlx::Error,
    },

    /// Checking or refreshing a derived view failed
    #[error("Failed to refresh derived view {view}: {source}")]
    Refresh {
        view: String,
        #[source]
        source: sqlx::Error,
    },

    /// A DDL script failed
    #[error("Failed to run {script} script: {source}")]
    Schema {
        script: String,
        #[source]
        source: sqlx::Error,
    },

    /// The connection pool could not be established
    #[error("Database connection failed: {0}. Check DATABASE_URL or DB_* settings.")]
    Connect(#[source] sqlx::Error),

    /// An extracted data-source directory is missing
    #[error("Data source directory '{}' does not exist", .0.display())]
    MissingSourceDir(PathBuf),

    #[error("Configuration error: {0}")]
    Config(String),

    /// The run was abandoned between data sources
    #[error("Import cancelled")]
    Cancelled,

    #[error("IO error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl IngestError {
    /// Whether the orchestrator may skip past this error
    pub fn is_recoverable(&self) -> bool {
        matches!(self, IngestError::NotFound { .. })
    }

    pub(crate) fn store(entity: EntityKind) -> impl FnOnce(sqlx::Error) -> Self {
        move |source| IngestError::Store { entity, source }
    }

    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| IngestError::Io { path, source }
    }
}

impl From<sedump_common::CommonError> for IngestError {
    fn from(err: sedump_common::CommonError) -> Self {
        IngestError::Config(err.to_string())
    }
}
