//! Command implementations

pub mod import;
pub mod queries;

use sedump_ingest::{create_pool, health_check, DbConfig};
use sqlx::PgPool;

use crate::error::Result;

/// Connect to the configured database and verify it answers
pub(crate) async fn connect() -> Result<PgPool> {
    let config = DbConfig::from_env()?;
    let pool = create_pool(&config).await?;
    health_check(&pool).await?;
    Ok(pool)
}
