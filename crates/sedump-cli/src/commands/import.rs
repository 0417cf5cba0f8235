use sqlx::PgPool;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use sedump_ingest::{schema, ImportSummary, Importer, IngestConfig, ProgressSink};

use crate::error::{CliError, Result};
use crate::progress::SpinnerProgress;
use crate::{resolve_scripts_dir, RunArgs};

/// Apply CLI overrides on top of the environment configuration
pub fn ingest_config(args: &RunArgs) -> Result<IngestConfig> {
    let mut config = IngestConfig::from_env()?;

    if let Some(ref data_dir) = args.data_dir {
        config = config.with_data_dir(data_dir);
    }
    if !args.sources.is_empty() {
        config = config.with_sources(&args.sources);
    }
    if args.skip_extract {
        config = config.with_skip_extract(true);
    }

    config.validate()?;
    Ok(config)
}

pub async fn run(args: &RunArgs, show_progress: bool) -> Result<ImportSummary> {
    let pool = super::connect().await?;
    run_with_pool(pool, args, show_progress).await
}

pub async fn run_with_pool(
    pool: PgPool,
    args: &RunArgs,
    show_progress: bool,
) -> Result<ImportSummary> {
    let config = ingest_config(args)?;
    tokio::fs::create_dir_all(&config.data_dir)
        .await
        .map_err(CliError::io(&config.data_dir))?;

    apply_schema(&pool, args).await?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after the current data source");
            on_signal.cancel();
        }
    });

    let spinner = show_progress.then(|| Arc::new(SpinnerProgress::new()));
    let mut importer = Importer::new(pool.clone(), config).with_cancellation(cancel);
    if let Some(ref spinner) = spinner {
        importer = importer.with_progress(Arc::clone(spinner) as Arc<dyn ProgressSink>);
    }

    let result = importer.import_all().await;
    if let Some(ref spinner) = spinner {
        spinner.finish(if result.is_ok() { "Import complete" } else { "Import failed" });
    }
    let summary = result?;

    schema::create_indexes(&pool).await?;

    for site in &summary.sites {
        info!(
            source = %site.name,
            records = site.records(),
            skipped = site.skipped.len(),
            repaired = site.repair.as_ref().map(|r| r.total()).unwrap_or(0),
            "Data source imported"
        );
    }

    Ok(summary)
}

/// Create the tables, preferring `create_schema.sql` from the scripts directory
async fn apply_schema(pool: &PgPool, args: &RunArgs) -> Result<()> {
    let script = resolve_scripts_dir(&args.scripts_dir)
        .ok()
        .map(|dir| dir.join("create_schema.sql"))
        .filter(|path| path.is_file());

    match script {
        Some(path) => schema::run_script_file(pool, &path).await?,
        None => schema::apply_schema(pool).await?,
    }
    Ok(())
}
