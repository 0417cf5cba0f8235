use super::{ConflictPolicy, EntityKind, EntityRecord, PgQuery};
use crate::coerce::{CoercionError, Fields};

/// A row of `Tags.xml`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: i64,
    pub tag_name: String,
    pub count: i64,
    pub excerpt_post_id: Option<i64>,
    pub wiki_post_id: Option<i64>,
}

impl EntityRecord for Tag {
    const KIND: EntityKind = EntityKind::Tags;

    const COLUMNS: &'static [&'static str] =
        &["id", "tag_name", "count", "excerpt_post_id", "wiki_post_id"];

    const CONFLICT: ConflictPolicy = ConflictPolicy::Ignore;

    fn from_fields(fields: &Fields<'_>) -> Result<Self, CoercionError> {
        Ok(Self {
            id: fields.int_or_zero("Id"),
            tag_name: fields.text("TagName"),
            count: fields.int_or_zero("Count"),
            excerpt_post_id: fields.nullable_int("ExcerptPostId")?,
            wiki_post_id: fields.nullable_int("WikiPostId")?,
        })
    }

    fn bind(self, query: PgQuery<'_>) -> PgQuery<'_> {
        query
            .bind(self.id)
            .bind(self.tag_name)
            .bind(self.count)
            .bind(self.excerpt_post_id)
            .bind(self.wiki_post_id)
    }
}
