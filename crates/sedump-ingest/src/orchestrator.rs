//! Site import orchestration
//!
//! Imports each configured data source in turn: extract the archive, load the
//! eight entity files in dependency order, repair post references right after
//! posts are in, and finally refresh the derived view once for the whole run.

use futures::future::LocalBoxFuture;
use serde::Serialize;
use sqlx::PgPool;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::{DataSource, IngestConfig};
use crate::discovery::find_entity_file;
use crate::entities::{
    Badge, Comment, EntityKind, EntityRecord, Post, PostHistory, PostLink, Tag, User, Vote,
};
use crate::error::{IngestError, IngestResult};
use crate::extract::extract_archive;
use crate::loader::{load_entity, LoadContext, LoadStats, LogProgress, ProgressSink};
use crate::refresh::{refresh_post_tags, RefreshOutcome};
use crate::repair::{repair_post_references, RepairStats};

/// Type-erased [`load_entity`] for one entity type
///
/// Loads run one after another on the importing task, so the future is not
/// required to be `Send`.
pub type LoaderFn =
    for<'a> fn(&'a LoadContext, &'a Path) -> LocalBoxFuture<'a, IngestResult<LoadStats>>;

/// One entry of the load plan
#[derive(Clone, Copy)]
pub struct LoadStep {
    pub kind: EntityKind,
    pub load: LoaderFn,
    /// Run the referential repair pass once this step succeeds
    pub repair_after: bool,
}

fn loader<'a, E: EntityRecord>(
    ctx: &'a LoadContext,
    path: &'a Path,
) -> LocalBoxFuture<'a, IngestResult<LoadStats>> {
    Box::pin(load_entity::<E>(ctx, path))
}

const fn step<E: EntityRecord>(repair_after: bool) -> LoadStep {
    LoadStep {
        kind: E::KIND,
        load: loader::<E>,
        repair_after,
    }
}

/// Entity load order. Users come before posts so the repair pass sees every
/// user; tables without foreign keys follow in any order.
pub const LOAD_PLAN: [LoadStep; 8] = [
    step::<User>(false),
    step::<Post>(true),
    step::<Comment>(false),
    step::<Badge>(false),
    step::<PostHistory>(false),
    step::<PostLink>(false),
    step::<Tag>(false),
    step::<Vote>(false),
];

/// Result of importing one data source
#[derive(Debug, Clone, Default, Serialize)]
pub struct SiteReport {
    pub name: String,
    pub dir: PathBuf,
    pub loaded: Vec<LoadStats>,
    /// Entity types with no source file
    pub skipped: Vec<EntityKind>,
    pub repair: Option<RepairStats>,
}

impl SiteReport {
    pub fn records(&self) -> u64 {
        self.loaded.iter().map(|s| s.records).sum()
    }
}

/// Result of a full import run
#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    pub sites: Vec<SiteReport>,
    pub refresh: RefreshOutcome,
}

impl ImportSummary {
    pub fn records(&self) -> u64 {
        self.sites.iter().map(SiteReport::records).sum()
    }
}

/// Drives the import of every configured data source
pub struct Importer {
    pool: PgPool,
    config: IngestConfig,
    progress: Arc<dyn ProgressSink>,
    cancel: CancellationToken,
}

impl Importer {
    pub fn new(pool: PgPool, config: IngestConfig) -> Self {
        Self {
            pool,
            config,
            progress: Arc::new(LogProgress),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = sink;
        self
    }

    /// Stop before the next data source once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Import all data sources in order, then refresh the derived view
    ///
    /// The first fatal error stops the run; sources already imported stay
    /// committed.
    pub async fn import_all(&self) -> IngestResult<ImportSummary> {
        self.config.validate()?;
        let started = Instant::now();
        let mut sites = Vec::with_capacity(self.config.sources.len());

        for source in &self.config.sources {
            if self.cancel.is_cancelled() {
                warn!(source = %source.name, "Import cancelled before data source");
                return Err(IngestError::Cancelled);
            }

            info!(source = %source.name, "Importing data source");
            sites.push(self.import_source(source).await?);
        }

        let refresh = refresh_post_tags(&self.pool).await?;
        let summary = ImportSummary { sites, refresh };

        info!(
            sources = summary.sites.len(),
            records = summary.records(),
            elapsed_secs = started.elapsed().as_secs(),
            "Import complete"
        );

        Ok(summary)
    }

    async fn import_source(&self, source: &DataSource) -> IngestResult<SiteReport> {
        if !self.config.skip_extract {
            extract_archive(&self.config.extractor, &source.archive, &source.dir).await?;
        }

        let mut report = self.import_site(&source.dir).await?;
        report.name = source.name.clone();
        Ok(report)
    }

    /// Load every entity file of an extracted dump directory
    pub async fn import_site(&self, dir: &Path) -> IngestResult<SiteReport> {
        if !dir.is_dir() {
            return Err(IngestError::MissingSourceDir(dir.to_path_buf()));
        }

        let ctx = LoadContext {
            pool: self.pool.clone(),
            progress: Arc::clone(&self.progress),
            progress_interval: self.config.progress_interval,
        };

        let mut report = SiteReport {
            name: dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            dir: dir.to_path_buf(),
            ..SiteReport::default()
        };

        for step in &LOAD_PLAN {
            let path = match find_entity_file(dir, step.kind.file_hint()) {
                Ok(path) => path,
                Err(e) if e.is_recoverable() => {
                    warn!(entity = %step.kind, dir = %dir.display(), "Source file missing, skipping");
                    report.skipped.push(step.kind);
                    continue;
                }
                Err(e) => return Err(e),
            };

            let stats = (step.load)(&ctx, &path).await?;
            report.loaded.push(stats);

            if step.repair_after {
                report.repair = Some(repair_post_references(&self.pool).await?);
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_plan_order() {
        let kinds: Vec<EntityKind> = LOAD_PLAN.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, EntityKind::ALL.to_vec());
    }

    #[test]
    fn test_repair_follows_posts_only() {
        let repairing: Vec<EntityKind> = LOAD_PLAN
            .iter()
            .filter(|s| s.repair_after)
            .map(|s| s.kind)
            .collect();
        assert_eq!(repairing, vec![EntityKind::Posts]);
    }
}
