//! Stack Exchange dump ingestion
//!
//! Streams the XML files of a site dump into Postgres:
//!
//! - [`decoder`] pulls `<row .../>` records out of a file one at a time
//! - [`coerce`] turns raw attribute text into typed column values
//! - [`entities`] defines the eight record types and their upserts
//! - [`loader`] loads one file with one prepared statement
//! - [`repair`] nulls dangling post references after posts are loaded
//! - [`orchestrator`] runs the whole import for every data source
//! - [`refresh`] brings the `post_tags` view up to date at the end
//!
//! # Example
//!
//! ```no_run
//! use sedump_ingest::{create_pool, DbConfig, Importer, IngestConfig};
//!
//! # async fn run() -> Result<(), sedump_ingest::IngestError> {
//! let pool = create_pool(&DbConfig::from_env()?).await?;
//! sedump_ingest::schema::apply_schema(&pool).await?;
//!
//! let summary = Importer::new(pool, IngestConfig::from_env()?)
//!     .import_all()
//!     .await?;
//! println!("loaded {} records", summary.records());
//! # Ok(())
//! # }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod coerce;
pub mod config;
pub mod db;
pub mod decoder;
pub mod discovery;
pub mod entities;
pub mod error;
pub mod extract;
pub mod loader;
pub mod orchestrator;
pub mod refresh;
pub mod repair;
pub mod schema;

pub use config::{DataSource, IngestConfig};
pub use db::{create_pool, health_check, DbConfig};
pub use entities::{EntityKind, EntityRecord};
pub use error::{IngestError, IngestResult};
pub use loader::{load_entity, LoadContext, LoadStats, LogProgress, ProgressSink};
pub use orchestrator::{ImportSummary, Importer, SiteReport, LOAD_PLAN};
pub use refresh::{RefreshOutcome, POST_TAGS_VIEW};
pub use repair::{repair_post_references, RepairStats};
