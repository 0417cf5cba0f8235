use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgSslMode};
use std::time::Duration;

use sedump_common::env;

use crate::error::{IngestError, IngestResult};

/// Connection settings used when `DATABASE_URL` is not set
///
/// Values go into [`PgConnectOptions`] field by field, so a password may
/// contain any character.
#[derive(Debug, Clone)]
pub struct ConnectionParts {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub ssl_mode: PgSslMode,
}

impl Default for ConnectionParts {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: "postgres".to_string(),
            database: "stackexchange".to_string(),
            ssl_mode: PgSslMode::Disable,
        }
    }
}

impl ConnectionParts {
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
            .ssl_mode(self.ssl_mode)
    }
}

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub connect_options: PgConnectOptions,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub max_lifetime_secs: Option<u64>,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            connect_options: ConnectionParts::default().connect_options(),
            max_connections: 25,
            min_connections: 5,
            connect_timeout_secs: 30,
            max_lifetime_secs: Some(3600),
        }
    }
}

impl DbConfig {
    /// Read `DATABASE_URL`, or assemble the connection from the `DB_*` variables
    pub fn from_env() -> IngestResult<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let connect_options = match env::var("DATABASE_URL") {
            Some(url) => url
                .parse::<PgConnectOptions>()
                .map_err(|e| IngestError::Config(format!("invalid DATABASE_URL: {e}")))?,
            None => parts_from_env()?.connect_options(),
        };

        Ok(Self {
            connect_options,
            max_connections: env::parse_or("DB_MAX_CONNECTIONS", defaults.max_connections)?,
            min_connections: env::parse_or("DB_MIN_CONNECTIONS", defaults.min_connections)?,
            connect_timeout_secs: env::parse_or(
                "DB_CONNECT_TIMEOUT",
                defaults.connect_timeout_secs,
            )?,
            max_lifetime_secs: env::parse("DB_MAX_LIFETIME")?.or(defaults.max_lifetime_secs),
        })
    }

    pub fn with_connect_options(mut self, options: PgConnectOptions) -> Self {
        self.connect_options = options;
        self
    }
}

fn parts_from_env() -> IngestResult<ConnectionParts> {
    let fallback = ConnectionParts::default();
    let ssl_mode = match env::var("DB_SSLMODE") {
        Some(mode) => mode
            .parse::<PgSslMode>()
            .map_err(|e| IngestError::Config(format!("invalid DB_SSLMODE '{mode}': {e}")))?,
        None => fallback.ssl_mode,
    };

    Ok(ConnectionParts {
        host: env::var("DB_HOST").unwrap_or(fallback.host),
        port: env::parse_or("DB_PORT", fallback.port)?,
        user: env::var("DB_USER").unwrap_or(fallback.user),
        password: env::var("DB_PASSWORD").unwrap_or(fallback.password),
        database: env::var("DB_NAME").unwrap_or(fallback.database),
        ssl_mode,
    })
}

pub async fn create_pool(config: &DbConfig) -> IngestResult<PgPool> {
    let mut options = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs));

    if let Some(max_lifetime) = config.max_lifetime_secs {
        options = options.max_lifetime(Duration::from_secs(max_lifetime));
    }

    let pool = options
        .connect_with(config.connect_options.clone())
        .await
        .map_err(IngestError::Connect)?;

    tracing::info!(
        host = config.connect_options.get_host(),
        database = config.connect_options.get_database().unwrap_or_default(),
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Database connection pool created"
    );

    Ok(pool)
}

pub async fn health_check(pool: &PgPool) -> IngestResult<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map(|_| ())
        .map_err(IngestError::Connect)
}
