//! End-to-end query runner tests against a real PostgreSQL
//!
//! Run with `cargo test -- --ignored` when Docker is available.

use sedump_cli::queries::{tag_tokens, QueryRunner};
use sedump_ingest::entities::Post;
use sedump_ingest::{load_entity, schema, LoadContext};
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use tempfile::TempDir;
use testcontainers::{core::IntoContainerPort, runners::AsyncRunner, ImageExt};
use testcontainers_modules::postgres::Postgres;

const POSTS_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<posts>
  <row Id="1" PostTypeId="1" CreationDate="2011-01-03T20:52:52.880" Score="12" Title="Indexing" Tags="&lt;postgresql&gt;&lt;index-tuning&gt;" />
  <row Id="2" PostTypeId="2" ParentId="1" CreationDate="2011-01-03T21:00:00.000" Score="5" />
  <row Id="3" PostTypeId="1" CreationDate="2011-01-04T08:00:00.000" Score="1" Title="Locks" Tags="&lt;mysql&gt;&lt;locking&gt;&lt;innodb&gt;" />
</posts>
"#;

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_run_all_builds_view_and_writes_results() {
    let container = Postgres::default()
        .with_tag("16-alpine")
        .start()
        .await
        .expect("Failed to start PostgreSQL container");
    let host = container.get_host().await.expect("host");
    let port = container
        .get_host_port_ipv4(5432.tcp())
        .await
        .expect("port");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&format!("postgresql://postgres:postgres@{host}:{port}/postgres"))
        .await
        .expect("connect");
    schema::apply_schema(&pool).await.expect("schema");

    let work = TempDir::new().expect("tempdir");
    let posts = work.path().join("Posts.xml");
    std::fs::write(&posts, POSTS_XML).expect("write posts");
    load_entity::<Post>(&LoadContext::new(pool.clone()), &posts)
        .await
        .expect("load posts");

    let scripts = work.path().join("scripts");
    std::fs::create_dir_all(&scripts).expect("scripts dir");
    std::fs::write(
        scripts.join("q1.sql"),
        "SELECT tag, COUNT(*) AS posts FROM post_tags GROUP BY tag ORDER BY tag;",
    )
    .expect("q1");
    std::fs::write(
        scripts.join("q2.sql"),
        "BEGIN;\nUPDATE posts SET score = score + 1;\nCOMMIT;",
    )
    .expect("q2");
    std::fs::write(scripts.join("q3.sql"), "SELECT * FROM missing_table;").expect("q3");

    let results = work.path().join("results");
    let report = QueryRunner::new(pool.clone())
        .run_all(&scripts, &results)
        .await
        .expect("run queries");

    assert_eq!(report.succeeded.len(), 2);
    assert_eq!(report.failed.len(), 1);

    let mut expected: Vec<String> = ["<postgresql><index-tuning>", "<mysql><locking><innodb>"]
        .iter()
        .flat_map(|tags| tag_tokens(tags))
        .collect();
    expected.sort();

    let rows: Vec<serde_json::Value> = serde_json::from_str(
        &std::fs::read_to_string(results.join("q1.sql.json")).expect("q1 results"),
    )
    .expect("json");
    let tags: Vec<String> = rows
        .iter()
        .map(|row| row["tag"].as_str().expect("tag").to_string())
        .collect();
    assert_eq!(tags, expected);
    assert_eq!(rows[0]["posts"], serde_json::json!(1));

    let plan = std::fs::read_to_string(results.join("q1.sql.explain.txt")).expect("plan");
    assert!(plan.contains("Execution Time"));

    // Transaction scripts are skipped, not executed
    assert!(!results.join("q2.sql.json").exists());
    let score: i64 = sqlx::query_scalar("SELECT score FROM posts WHERE id = 1")
        .fetch_one(&pool)
        .await
        .expect("score");
    assert_eq!(score, 12);
}
