//! Shared helpers for store-backed ingestion tests
//!
//! Each test starts its own PostgreSQL container with the dump schema
//! applied, and writes small dump files into a temporary site directory.

#![allow(dead_code)]

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use testcontainers::{core::IntoContainerPort, runners::AsyncRunner, ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tracing::info;

use sedump_ingest::schema;

/// PostgreSQL container with the dump tables created
pub struct TestPostgres {
    _container: ContainerAsync<Postgres>,
    pool: PgPool,
    connection_string: String,
}

impl TestPostgres {
    pub async fn start() -> Result<Self> {
        info!("Starting PostgreSQL test container...");

        let container = Postgres::default()
            .with_tag("16-alpine")
            .start()
            .await
            .context("Failed to start PostgreSQL container")?;

        let host = container
            .get_host()
            .await
            .context("Failed to get container host")?;
        let port = container
            .get_host_port_ipv4(5432.tcp())
            .await
            .context("Failed to get container port")?;

        let connection_string = format!("postgresql://postgres:postgres@{host}:{port}/postgres");

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&connection_string)
            .await
            .context("Failed to connect to PostgreSQL")?;

        schema::apply_schema(&pool)
            .await
            .context("Failed to apply schema")?;

        Ok(Self {
            _container: container,
            pool,
            connection_string,
        })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn pool_clone(&self) -> PgPool {
        self.pool.clone()
    }

    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    pub async fn count(&self, table: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&self.pool)
            .await
            .with_context(|| format!("Failed to count {table}"))?;
        Ok(count)
    }
}

/// A temporary site directory holding dump files
pub struct SiteFixture {
    root: TempDir,
    name: String,
}

impl SiteFixture {
    pub fn new(name: &str) -> Result<Self> {
        let root = TempDir::new()?;
        std::fs::create_dir_all(root.path().join(name))?;
        Ok(Self {
            root,
            name: name.to_string(),
        })
    }

    /// Directory that plays the role of `DATA_DIR`
    pub fn data_dir(&self) -> &Path {
        self.root.path()
    }

    /// Extracted site directory
    pub fn dir(&self) -> PathBuf {
        self.root.path().join(&self.name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Write `<root>` wrapping the given `row` elements to `file`
    pub fn write(&self, file: &str, root: &str, rows: &[&str]) -> Result<PathBuf> {
        self.write_to(&self.name, file, root, rows)
    }

    /// Add another extracted site next to the first one
    pub fn add_site(&self, name: &str) -> Result<PathBuf> {
        let dir = self.root.path().join(name);
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Like [`SiteFixture::write`], for a site created with [`SiteFixture::add_site`]
    pub fn write_to(&self, site: &str, file: &str, root: &str, rows: &[&str]) -> Result<PathBuf> {
        let mut xml = format!("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<{root}>\n");
        for row in rows {
            xml.push_str("  ");
            xml.push_str(row);
            xml.push('\n');
        }
        xml.push_str(&format!("</{root}>\n"));

        let path = self.root.path().join(site).join(file);
        std::fs::write(&path, xml)?;
        Ok(path)
    }

    pub fn write_raw(&self, file: &str, contents: &str) -> Result<PathBuf> {
        let path = self.dir().join(file);
        std::fs::write(&path, contents)?;
        Ok(path)
    }
}

pub const USERS: &[&str] = &[
    r#"<row Id="-1" Reputation="1" CreationDate="2011-01-03T20:07:09.953" DisplayName="Community" Views="0" UpVotes="5" DownVotes="3" AccountId="-1" />"#,
    r#"<row Id="7" Reputation="1200" CreationDate="2011-01-03T20:12:40.110" DisplayName="Jack" LastAccessDate="2014-06-01T10:00:00.000" Views="80" UpVotes="40" DownVotes="1" AccountId="3550" />"#,
];

pub const POSTS: &[&str] = &[
    r#"<row Id="1" PostTypeId="1" AcceptedAnswerId="2" CreationDate="2011-01-03T20:52:52.880" Score="12" ViewCount="400" Body="&lt;p&gt;Index?&lt;/p&gt;" OwnerUserId="7" Title="Indexing" Tags="&lt;postgresql&gt;&lt;index-tuning&gt;" AnswerCount="1" CommentCount="1" />"#,
    r#"<row Id="2" PostTypeId="2" ParentId="1" CreationDate="2011-01-03T21:00:00.000" Score="5" Body="&lt;p&gt;Yes.&lt;/p&gt;" OwnerUserId="-1" CommentCount="0" />"#,
];

pub fn init_test_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let _ = fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info,sedump_ingest=debug,sqlx=warn,testcontainers=info")
        }))
        .with_test_writer()
        .try_init();
}
