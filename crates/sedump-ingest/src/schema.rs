//! Embedded DDL for the dump tables

use sqlx::PgPool;
use std::path::Path;
use tracing::info;

use crate::error::{IngestError, IngestResult};

pub const CREATE_SCHEMA_SQL: &str = include_str!("../sql/create_schema.sql");
pub const CREATE_INDEXES_SQL: &str = include_str!("../sql/indexes.sql");

/// Create the eight entity tables if they do not exist
pub async fn apply_schema(pool: &PgPool) -> IngestResult<()> {
    run_script(pool, "create_schema", CREATE_SCHEMA_SQL).await
}

/// Create the secondary indexes; run after loading
pub async fn create_indexes(pool: &PgPool) -> IngestResult<()> {
    run_script(pool, "indexes", CREATE_INDEXES_SQL).await
}

/// Execute a multi-statement script
pub async fn run_script(pool: &PgPool, name: &str, sql: &str) -> IngestResult<()> {
    sqlx::raw_sql(sql)
        .execute(pool)
        .await
        .map_err(|source| IngestError::Schema {
            script: name.to_string(),
            source,
        })?;
    info!(script = name, "Applied SQL script");
    Ok(())
}

/// Execute a script read from disk, named after its file stem
pub async fn run_script_file(pool: &PgPool, path: &Path) -> IngestResult<()> {
    let sql = tokio::fs::read_to_string(path)
        .await
        .map_err(IngestError::io(path))?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    run_script(pool, &name, &sql).await
}
