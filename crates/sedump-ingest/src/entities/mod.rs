//! Entity definitions for the eight dump record types
//!
//! Each entity type knows its target table, its ordered column list, how to
//! build itself from a decoded record and how to bind its values onto a
//! prepared upsert statement. The loader is generic over [`EntityRecord`].

use serde::Serialize;
use sqlx::postgres::PgArguments;
use sqlx::Postgres;
use std::fmt;

use crate::coerce::{CoercionError, Fields};

pub mod badges;
pub mod comments;
pub mod post_history;
pub mod post_links;
pub mod posts;
pub mod tags;
pub mod users;
pub mod votes;

pub use badges::Badge;
pub use comments::Comment;
pub use post_history::PostHistory;
pub use post_links::PostLink;
pub use posts::Post;
pub use tags::Tag;
pub use users::User;
pub use votes::Vote;

/// Query type produced by binding onto a prepared statement
pub type PgQuery<'q> = sqlx::query::Query<'q, Postgres, PgArguments>;

/// The record types found in a site dump
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EntityKind {
    Users,
    Posts,
    Comments,
    Badges,
    PostHistory,
    PostLinks,
    Tags,
    Votes,
}

impl EntityKind {
    /// All kinds in load order
    pub const ALL: [EntityKind; 8] = [
        EntityKind::Users,
        EntityKind::Posts,
        EntityKind::Comments,
        EntityKind::Badges,
        EntityKind::PostHistory,
        EntityKind::PostLinks,
        EntityKind::Tags,
        EntityKind::Votes,
    ];

    /// Case-insensitive substring used to locate the source file
    pub fn file_hint(self) -> &'static str {
        match self {
            EntityKind::Users => "Users",
            EntityKind::Posts => "Posts",
            EntityKind::Comments => "Comments",
            EntityKind::Badges => "Badges",
            EntityKind::PostHistory => "PostHistory",
            EntityKind::PostLinks => "PostLinks",
            EntityKind::Tags => "Tags",
            EntityKind::Votes => "Votes",
        }
    }

    pub fn table(self) -> &'static str {
        match self {
            EntityKind::Users => "users",
            EntityKind::Posts => "posts",
            EntityKind::Comments => "comments",
            EntityKind::Badges => "badges",
            EntityKind::PostHistory => "post_history",
            EntityKind::PostLinks => "post_links",
            EntityKind::Tags => "tags",
            EntityKind::Votes => "votes",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_hint())
    }
}

/// What an upsert does when a row with the same id already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Overwrite the listed columns with the incoming values
    Update(&'static [&'static str]),
    /// Keep the stored row untouched
    Ignore,
}

/// A record type that can be loaded into its table
pub trait EntityRecord: Sized + Send + 'static {
    const KIND: EntityKind;

    /// Column names in bind order; the first is always the `id` key
    const COLUMNS: &'static [&'static str];

    const CONFLICT: ConflictPolicy;

    /// DDL run on the loading connection before the first row
    const PRE_LOAD_SQL: Option<&'static str> = None;

    fn from_fields(fields: &Fields<'_>) -> Result<Self, CoercionError>;

    /// Bind every column value in `COLUMNS` order
    fn bind(self, query: PgQuery<'_>) -> PgQuery<'_>;
}

/// Build the upsert statement for an entity type
pub fn upsert_sql<E: EntityRecord>() -> String {
    let columns = E::COLUMNS.join(", ");
    let placeholders = (1..=E::COLUMNS.len())
        .map(|i| format!("${i}"))
        .collect::<Vec<_>>()
        .join(", ");

    let action = match E::CONFLICT {
        ConflictPolicy::Update(targets) => {
            let assignments = targets
                .iter()
                .map(|c| format!("{c} = EXCLUDED.{c}"))
                .collect::<Vec<_>>()
                .join(", ");
            format!("DO UPDATE SET {assignments}")
        }
        ConflictPolicy::Ignore => "DO NOTHING".to_string(),
    };

    format!(
        "INSERT INTO {} ({columns}) VALUES ({placeholders}) ON CONFLICT (id) {action}",
        E::KIND.table()
    )
}
