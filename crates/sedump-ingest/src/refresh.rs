//! Derived-view refresh
//!
//! The `post_tags` materialized view is created by the query runner, so a
//! first import finds nothing to refresh. Later imports bring it up to date.

use serde::Serialize;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::error::{IngestError, IngestResult};

/// Materialized view mapping posts to their individual tags
pub const POST_TAGS_VIEW: &str = "post_tags";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Absent,
    Present,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RefreshOutcome {
    Refreshed,
    /// The view does not exist yet
    Skipped,
}

/// Look up a materialized view in the catalog
pub async fn view_state(pool: &PgPool, view: &str) -> IngestResult<ViewState> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM pg_matviews WHERE matviewname = $1)",
    )
    .bind(view)
    .fetch_one(pool)
    .await
    .map_err(|source| IngestError::Refresh {
        view: view.to_string(),
        source,
    })?;

    Ok(if exists {
        ViewState::Present
    } else {
        ViewState::Absent
    })
}

/// Refresh a materialized view if it exists
pub async fn refresh_view(pool: &PgPool, view: &str) -> IngestResult<RefreshOutcome> {
    if view_state(pool, view).await? == ViewState::Absent {
        warn!(view, "Materialized view does not exist, skipping refresh");
        return Ok(RefreshOutcome::Skipped);
    }

    sqlx::raw_sql(&format!("REFRESH MATERIALIZED VIEW \"{}\"", view.replace('"', "\"\"")))
        .execute(pool)
        .await
        .map_err(|source| IngestError::Refresh {
            view: view.to_string(),
            source,
        })?;

    info!(view, "Refreshed materialized view");
    Ok(RefreshOutcome::Refreshed)
}

/// Refresh the `post_tags` view
pub async fn refresh_post_tags(pool: &PgPool) -> IngestResult<RefreshOutcome> {
    refresh_view(pool, POST_TAGS_VIEW).await
}
