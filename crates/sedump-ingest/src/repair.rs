//! Referential repair for post references
//!
//! Dumps are pruned independently per table, so a post can point at an
//! answer, parent or user that is not in the dump. After the Posts load the
//! dangling references are set to null so the foreign keys can be restored.

use serde::Serialize;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::error::{IngestError, IngestResult};

/// A nullable `posts` column and the table its value must exist in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostReference {
    pub column: &'static str,
    pub target_table: &'static str,
}

impl PostReference {
    /// Statement nulling every value of the column with no matching target row
    pub fn repair_sql(&self) -> String {
        format!(
            "UPDATE posts SET {column} = NULL \
             WHERE {column} IS NOT NULL \
             AND NOT EXISTS (SELECT 1 FROM {target} t WHERE t.id = posts.{column})",
            column = self.column,
            target = self.target_table,
        )
    }
}

/// Reference columns repaired after loading posts, in repair order
pub const POST_REFERENCES: [PostReference; 4] = [
    PostReference {
        column: "accepted_answer_id",
        target_table: "posts",
    },
    PostReference {
        column: "parent_id",
        target_table: "posts",
    },
    PostReference {
        column: "owner_user_id",
        target_table: "users",
    },
    PostReference {
        column: "last_editor_user_id",
        target_table: "users",
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnRepair {
    pub column: &'static str,
    pub rows_nulled: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepairStats {
    pub columns: Vec<ColumnRepair>,
}

impl RepairStats {
    pub fn total(&self) -> u64 {
        self.columns.iter().map(|c| c.rows_nulled).sum()
    }
}

/// Null out post references whose target row does not exist
///
/// Runs all four updates in one transaction. Safe to repeat; a second run
/// changes nothing.
pub async fn repair_post_references(pool: &PgPool) -> IngestResult<RepairStats> {
    let failed = |stage: &str| {
        let stage = stage.to_string();
        move |source| IngestError::Repair { stage, source }
    };

    let mut tx = pool.begin().await.map_err(failed("begin"))?;
    let mut stats = RepairStats::default();

    for reference in POST_REFERENCES {
        let result = sqlx::query(&reference.repair_sql())
            .execute(&mut *tx)
            .await
            .map_err(failed(reference.column))?;

        let rows_nulled = result.rows_affected();
        if rows_nulled > 0 {
            warn!(
                column = reference.column,
                rows = rows_nulled,
                "Nulled dangling post references"
            );
        }
        stats.columns.push(ColumnRepair {
            column: reference.column,
            rows_nulled,
        });
    }

    tx.commit().await.map_err(failed("commit"))?;
    info!(rows = stats.total(), "Referential repair complete");

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repair_sql_targets_the_right_table() {
        assert_eq!(
            POST_REFERENCES[2].repair_sql(),
            "UPDATE posts SET owner_user_id = NULL WHERE owner_user_id IS NOT NULL \
             AND NOT EXISTS (SELECT 1 FROM users t WHERE t.id = posts.owner_user_id)"
        );
        assert!(POST_REFERENCES[0]
            .repair_sql()
            .contains("FROM posts t WHERE t.id = posts.accepted_answer_id"));
    }

    #[test]
    fn test_repair_stats_total() {
        let stats = RepairStats {
            columns: vec![
                ColumnRepair {
                    column: "parent_id",
                    rows_nulled: 2,
                },
                ColumnRepair {
                    column: "owner_user_id",
                    rows_nulled: 5,
                },
            ],
        };
        assert_eq!(stats.total(), 7);
    }
}
