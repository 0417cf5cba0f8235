//! Generic entity loader
//!
//! Streams one dump file through the decoder and coercer and upserts every
//! record with a single prepared statement on one pooled connection. The first
//! bad record aborts the file. A file that cannot be opened fails before a
//! connection is taken.

use serde::Serialize;
use sqlx::{Executor, PgConnection, PgPool, Statement};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::coerce::Fields;
use crate::decoder::RecordReader;
use crate::entities::{upsert_sql, EntityKind, EntityRecord};
use crate::error::{IngestError, IngestResult};

/// Receives running record counts while a file is being loaded
pub trait ProgressSink: Send + Sync {
    fn records_loaded(&self, entity: EntityKind, records: u64);
}

/// Default sink that reports progress through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn records_loaded(&self, entity: EntityKind, records: u64) {
        info!(entity = %entity, records, "Processed records");
    }
}

/// Outcome of loading one entity file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    pub entity: EntityKind,
    pub file: PathBuf,
    pub records: u64,
}

/// Shared state for the loaders of one import run
#[derive(Clone)]
pub struct LoadContext {
    pub pool: PgPool,
    pub progress: Arc<dyn ProgressSink>,
    pub progress_interval: u64,
}

impl LoadContext {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            progress: Arc::new(LogProgress),
            progress_interval: crate::config::DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

/// Load every record of `path` into the table of `E`
pub async fn load_entity<E: EntityRecord>(
    ctx: &LoadContext,
    path: &Path,
) -> IngestResult<LoadStats> {
    let kind = E::KIND;
    let started = Instant::now();
    info!(entity = %kind, file = %path.display(), "Loading entity file");

    let sink = Arc::clone(&ctx.progress);
    let mut records = RecordReader::open_async(path)
        .await
        .map_err(IngestError::io(path))?
        .with_progress(ctx.progress_interval, move |n| sink.records_loaded(kind, n));

    let mut pooled = ctx.pool.acquire().await.map_err(IngestError::store(kind))?;
    let conn: &mut PgConnection = &mut pooled;

    if let Some(ddl) = E::PRE_LOAD_SQL {
        debug!(entity = %kind, "Running pre-load DDL");
        sqlx::raw_sql(ddl)
            .execute(&mut *conn)
            .await
            .map_err(IngestError::store(kind))?;
    }

    let sql = upsert_sql::<E>();
    let statement = (&mut *conn)
        .prepare(&sql)
        .await
        .map_err(IngestError::store(kind))?;

    let mut loaded: u64 = 0;
    while let Some(item) = records.next_async().await {
        let attributes = item.map_err(|source| IngestError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

        let record = E::from_fields(&Fields::new(&attributes)).map_err(|source| {
            IngestError::Coercion {
                entity: kind,
                record: loaded + 1,
                id: attributes.get("Id").map(String::from),
                source,
            }
        })?;

        record
            .bind(statement.query())
            .execute(&mut *conn)
            .await
            .map_err(IngestError::store(kind))?;
        loaded += 1;
    }

    info!(
        entity = %kind,
        records = loaded,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Finished loading entity file"
    );

    Ok(LoadStats {
        entity: kind,
        file: path.to_path_buf(),
        records: loaded,
    })
}
