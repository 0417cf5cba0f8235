//! Analytical query runner
//!
//! Creates the `post_tags` view, restores the post foreign keys, then runs
//! every `q*.sql` file of a scripts directory. Each query gets an
//! `EXPLAIN ANALYZE` plan written to `<file>.explain.txt` and its result set
//! written as a JSON array to `<file>.json`.

use serde_json::{Map, Number, Value};
use sqlx::postgres::PgRow;
use sqlx::{Column, PgPool, Row, TypeInfo};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use sedump_ingest::coerce::TIMESTAMP_FORMAT;

use crate::error::{CliError, Result};

/// Embedded definition of `extract_tags` and the `post_tags` view
pub const POST_TAGS_SQL: &str = include_str!("../sql/post_tags.sql");

/// Optional script in the scripts directory overriding [`POST_TAGS_SQL`]
pub const POST_TAGS_SCRIPT: &str = "create_post_tags.sql";

pub const CONSTRAINTS_SCRIPT: &str = "add_constraints.sql";

/// Split `<a><b-c>` tag text into its tokens, the same way `extract_tags` does
pub fn tag_tokens(tags: &str) -> Vec<String> {
    tags.replace(['<', '>'], " ")
        .split_whitespace()
        .map(String::from)
        .collect()
}

/// Whether a script manages transactions or DDL and must not be explained
pub fn contains_transaction(sql: &str) -> bool {
    let lower = sql.to_lowercase();
    ["begin", "commit", "create ", "alter "]
        .iter()
        .any(|keyword| lower.contains(keyword))
}

/// Drop a leading `EXPLAIN ANALYZE` so the query returns its own rows
pub fn strip_explain_analyze(sql: &str) -> &str {
    const PREFIX: &str = "explain analyze";

    match sql.to_ascii_lowercase().find(PREFIX) {
        Some(pos) => sql[pos + PREFIX.len()..].trim_start(),
        None => sql,
    }
}

/// List the analytical query files (`q*.sql`) in name order
pub fn query_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(CliError::io(dir))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(CliError::io(dir))?.path();
        let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        if name.starts_with('q') && name.ends_with(".sql") && path.is_file() {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "query".to_string())
}

/// Outcome of a query run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryReport {
    pub succeeded: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
}

pub struct QueryRunner {
    pool: PgPool,
}

impl QueryRunner {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Prepare derived objects and run all analytical queries
    ///
    /// View creation and constraint failures are logged and do not stop the
    /// queries from running.
    pub async fn run_all(&self, queries_dir: &Path, results_dir: &Path) -> Result<QueryReport> {
        info!(dir = %queries_dir.display(), "Running all queries");

        if let Err(e) = self.create_post_tags(queries_dir).await {
            error!(error = %e, "Failed to create post_tags view");
        }

        let constraints = queries_dir.join(CONSTRAINTS_SCRIPT);
        if constraints.is_file() {
            info!("Adding post foreign keys");
            match self.run_script(&constraints).await {
                Ok(()) => info!("Foreign keys added"),
                Err(e) => error!(error = %e, "Failed to add foreign keys"),
            }
        }

        self.run_analytical_queries(queries_dir, results_dir).await
    }

    /// (Re)create the `post_tags` materialized view
    pub async fn create_post_tags(&self, queries_dir: &Path) -> Result<()> {
        let script = queries_dir.join(POST_TAGS_SCRIPT);
        let sql = if script.is_file() {
            tokio::fs::read_to_string(&script)
                .await
                .map_err(CliError::io(&script))?
        } else {
            POST_TAGS_SQL.to_string()
        };

        sqlx::raw_sql(&sql).execute(&self.pool).await?;
        info!("Created post_tags materialized view");
        Ok(())
    }

    async fn run_script(&self, path: &Path) -> Result<()> {
        let sql = tokio::fs::read_to_string(path)
            .await
            .map_err(CliError::io(path))?;
        sqlx::raw_sql(&sql).execute(&self.pool).await?;
        Ok(())
    }

    /// Run every `q*.sql` file; individual failures are logged and skipped
    pub async fn run_analytical_queries(
        &self,
        queries_dir: &Path,
        results_dir: &Path,
    ) -> Result<QueryReport> {
        let mut report = QueryReport::default();

        for path in query_files(queries_dir)? {
            info!(file = %path.display(), "Processing query");
            match self.explain_query(&path, results_dir).await {
                Ok(()) => report.succeeded.push(path),
                Err(e) => {
                    error!(file = %path.display(), error = %e, "Query failed");
                    report.failed.push(path);
                }
            }
        }

        info!(
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            "Analytical queries finished"
        );
        Ok(report)
    }

    /// Write the `EXPLAIN ANALYZE` plan of a query, then execute it
    pub async fn explain_query(&self, path: &Path, out_dir: &Path) -> Result<()> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(CliError::io(path))?;

        if contains_transaction(&text) {
            warn!(file = %path.display(), "Script manages transactions or DDL, skipping EXPLAIN ANALYZE");
            return Ok(());
        }

        let explain = format!("EXPLAIN ANALYZE {}", strip_explain_analyze(&text));
        match sqlx::raw_sql(&explain).fetch_all(&self.pool).await {
            Ok(rows) => {
                let mut plan = String::new();
                for row in &rows {
                    let line: String = row.try_get(0)?;
                    plan.push_str(&line);
                    plan.push('\n');
                }

                ensure_dir(out_dir).await?;
                let plan_path = out_dir.join(format!("{}.explain.txt", file_name(path)));
                tokio::fs::write(&plan_path, plan)
                    .await
                    .map_err(CliError::io(&plan_path))?;
                info!(file = %path.display(), output = %plan_path.display(), "Wrote query plan");
            }
            Err(e) => {
                warn!(file = %path.display(), error = %e, "EXPLAIN failed, running query without it");
            }
        }

        self.execute_query(path, out_dir).await.map(|_| ())
    }

    /// Run a query file and write its rows to `<file>.json`
    ///
    /// Returns the number of rows written.
    pub async fn execute_query(&self, path: &Path, out_dir: &Path) -> Result<usize> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(CliError::io(path))?;

        let rows = sqlx::raw_sql(strip_explain_analyze(&text))
            .fetch_all(&self.pool)
            .await?;
        let results: Vec<Value> = rows.iter().map(row_to_json).collect();

        ensure_dir(out_dir).await?;
        let output = out_dir.join(format!("{}.json", file_name(path)));
        let json = serde_json::to_string_pretty(&results)?;
        tokio::fs::write(&output, json)
            .await
            .map_err(CliError::io(&output))?;

        info!(
            file = %path.display(),
            rows = results.len(),
            output = %output.display(),
            "Query executed"
        );
        Ok(results.len())
    }
}

async fn ensure_dir(dir: &Path) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(CliError::io(dir))
}

/// Convert a result row into a JSON object keyed by column name
pub fn row_to_json(row: &PgRow) -> Value {
    let mut object = Map::new();
    for (i, column) in row.columns().iter().enumerate() {
        object.insert(column.name().to_string(), column_value(row, i, column.type_info().name()));
    }
    Value::Object(object)
}

fn column_value(row: &PgRow, i: usize, type_name: &str) -> Value {
    fn get<'r, T>(row: &'r PgRow, i: usize) -> Option<T>
    where
        T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
    {
        row.try_get::<Option<T>, _>(i).ok().flatten()
    }

    let value = match type_name {
        "INT2" => get::<i16>(row, i).map(Value::from),
        "INT4" => get::<i32>(row, i).map(Value::from),
        "INT8" => get::<i64>(row, i).map(Value::from),
        "FLOAT4" => get::<f32>(row, i).and_then(|f| Number::from_f64(f64::from(f)).map(Value::Number)),
        "FLOAT8" => get::<f64>(row, i).and_then(|f| Number::from_f64(f).map(Value::Number)),
        "NUMERIC" => get::<sqlx::types::BigDecimal>(row, i).map(|d| Value::String(d.to_string())),
        "BOOL" => get::<bool>(row, i).map(Value::Bool),
        "TIMESTAMP" => get::<chrono::NaiveDateTime>(row, i)
            .map(|t| Value::String(t.format(TIMESTAMP_FORMAT).to_string())),
        "TIMESTAMPTZ" => get::<chrono::DateTime<chrono::Utc>>(row, i)
            .map(|t| Value::String(t.to_rfc3339())),
        "DATE" => get::<chrono::NaiveDate>(row, i).map(|d| Value::String(d.to_string())),
        "JSON" | "JSONB" => get::<Value>(row, i),
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => get::<String>(row, i).map(Value::String),
        _ => None,
    };
    value.unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_tokens() {
        assert_eq!(
            tag_tokens("<postgresql><index-tuning><performance>"),
            vec!["postgresql", "index-tuning", "performance"]
        );
        assert!(tag_tokens("").is_empty());
        assert!(tag_tokens("<>").is_empty());
    }

    #[test]
    fn test_contains_transaction() {
        assert!(contains_transaction("BEGIN;\nUPDATE posts SET score = 0;\nCOMMIT;"));
        assert!(contains_transaction("CREATE INDEX idx ON posts (score);"));
        assert!(contains_transaction("alter table posts add column x int;"));
        assert!(!contains_transaction("SELECT tag, COUNT(*) FROM post_tags GROUP BY tag;"));
    }

    #[test]
    fn test_strip_explain_analyze() {
        assert_eq!(
            strip_explain_analyze("EXPLAIN ANALYZE\n  SELECT 1;"),
            "SELECT 1;"
        );
        assert_eq!(strip_explain_analyze("explain analyze select 1"), "select 1");
        assert_eq!(strip_explain_analyze("SELECT 2"), "SELECT 2");
        assert_eq!(strip_explain_analyze("EXPLAIN ANALYZE"), "");
    }

    #[test]
    fn test_query_files_sorted_and_filtered() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        for name in ["q2.sql", "q1.sql", "add_constraints.sql", "q3.txt", "notes.sql"] {
            std::fs::write(dir.path().join(name), "SELECT 1;").expect("write");
        }

        let names: Vec<String> = query_files(dir.path())
            .expect("list")
            .iter()
            .map(|p| file_name(p))
            .collect();
        assert_eq!(names, vec!["q1.sql", "q2.sql"]);
    }

    #[test]
    fn test_embedded_view_script() {
        assert!(POST_TAGS_SQL.contains("CREATE OR REPLACE FUNCTION extract_tags"));
        assert!(POST_TAGS_SQL.contains("CREATE MATERIALIZED VIEW post_tags"));
    }
}
