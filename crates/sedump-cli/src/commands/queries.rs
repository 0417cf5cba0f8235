use sqlx::PgPool;
use tracing::info;

use crate::error::Result;
use crate::queries::{QueryReport, QueryRunner};
use crate::{resolve_scripts_dir, RunArgs};

pub async fn run(args: &RunArgs) -> Result<QueryReport> {
    let pool = super::connect().await?;
    run_with_pool(pool, args).await
}

pub async fn run_with_pool(pool: PgPool, args: &RunArgs) -> Result<QueryReport> {
    let scripts_dir = resolve_scripts_dir(&args.scripts_dir)?;
    info!(
        scripts_dir = %scripts_dir.display(),
        results_dir = %args.results_dir.display(),
        "Running queries"
    );

    QueryRunner::new(pool)
        .run_all(&scripts_dir, &args.results_dir)
        .await
}
