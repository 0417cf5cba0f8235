//! Import configuration
//!
//! Values come from defaults, then the environment (including `.env`), and
//! finally from explicit overrides applied by the caller.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use sedump_common::env;

use crate::error::{IngestError, IngestResult};

/// Records between two progress notifications
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 10_000;

pub const DEFAULT_SOURCES: [&str; 2] = ["dba.stackexchange.com", "dba.meta.stackexchange.com"];

pub const DEFAULT_EXTRACTOR: &str = "7z";

/// One site dump: its compressed archive and the directory it unpacks into
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSource {
    pub name: String,
    pub archive: PathBuf,
    pub dir: PathBuf,
}

impl DataSource {
    pub fn new(data_dir: &Path, name: &str) -> Self {
        Self {
            name: name.to_string(),
            archive: data_dir.join(format!("{name}.7z")),
            dir: data_dir.join(name),
        }
    }
}

/// Import run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    pub data_dir: PathBuf,

    /// Data sources in import order
    pub sources: Vec<DataSource>,

    /// Archive tool invoked as `<extractor> x <archive> -o<dir> -y`
    pub extractor: String,

    pub progress_interval: u64,

    /// Use already extracted directories instead of unpacking archives
    pub skip_extract: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        let data_dir = PathBuf::from("./data");
        let sources = DEFAULT_SOURCES
            .iter()
            .map(|name| DataSource::new(&data_dir, name))
            .collect();

        Self {
            data_dir,
            sources,
            extractor: DEFAULT_EXTRACTOR.to_string(),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            skip_extract: false,
        }
    }
}

impl IngestConfig {
    /// Load configuration from environment variables
    ///
    /// Reads `.env` if present, then:
    /// - `DATA_DIR`: root directory for archives and extracted dumps
    /// - `SEDUMP_SOURCES`: comma-separated site names
    /// - `SEDUMP_EXTRACTOR`: archive tool
    /// - `SEDUMP_PROGRESS_INTERVAL`: records between progress reports
    /// - `SEDUMP_SKIP_EXTRACT`: boolean
    pub fn from_env() -> IngestResult<Self> {
        dotenvy::dotenv().ok();

        let data_dir = env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./data"));
        let names = env::list("SEDUMP_SOURCES").unwrap_or_else(|| {
            DEFAULT_SOURCES.iter().map(|s| s.to_string()).collect()
        });

        let config = Self {
            sources: names
                .iter()
                .map(|name| DataSource::new(&data_dir, name))
                .collect(),
            data_dir,
            extractor: env::var("SEDUMP_EXTRACTOR")
                .unwrap_or_else(|| DEFAULT_EXTRACTOR.to_string()),
            progress_interval: env::parse_or("SEDUMP_PROGRESS_INTERVAL", DEFAULT_PROGRESS_INTERVAL)?,
            skip_extract: env::flag("SEDUMP_SKIP_EXTRACT")?.unwrap_or(false),
        };

        config.validate()?;
        Ok(config)
    }

    /// Point every source at a new data directory
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        let names: Vec<String> = self.sources.iter().map(|s| s.name.clone()).collect();
        self.sources = names
            .iter()
            .map(|name| DataSource::new(&self.data_dir, name))
            .collect();
        self
    }

    /// Replace the source list with the given site names
    pub fn with_sources<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.sources = names
            .into_iter()
            .map(|name| DataSource::new(&self.data_dir, name.as_ref()))
            .collect();
        self
    }

    pub fn with_skip_extract(mut self, skip: bool) -> Self {
        self.skip_extract = skip;
        self
    }

    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn validate(&self) -> IngestResult<()> {
        if self.sources.is_empty() {
            return Err(IngestError::Config(
                "at least one data source is required".to_string(),
            ));
        }

        if self.progress_interval == 0 {
            return Err(IngestError::Config(
                "progress interval must be greater than 0".to_string(),
            ));
        }

        if self.extractor.trim().is_empty() && !self.skip_extract {
            return Err(IngestError::Config(
                "an extractor program is required unless extraction is skipped".to_string(),
            ));
        }

        Ok(())
    }
}
