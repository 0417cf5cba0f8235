use chrono::NaiveDateTime;

use super::{ConflictPolicy, EntityKind, EntityRecord, PgQuery};
use crate::coerce::{CoercionError, Fields};

/// A row of `PostLinks.xml`
#[derive(Debug, Clone, PartialEq)]
pub struct PostLink {
    pub id: i64,
    pub creation_date: NaiveDateTime,
    pub post_id: i64,
    pub related_post_id: i64,
    /// 1 linked, 3 duplicate
    pub link_type_id: i64,
}

impl EntityRecord for PostLink {
    const KIND: EntityKind = EntityKind::PostLinks;

    const COLUMNS: &'static [&'static str] = &[
        "id",
        "creation_date",
        "post_id",
        "related_post_id",
        "link_type_id",
    ];

    const CONFLICT: ConflictPolicy = ConflictPolicy::Ignore;

    fn from_fields(fields: &Fields<'_>) -> Result<Self, CoercionError> {
        Ok(Self {
            id: fields.int_or_zero("Id"),
            creation_date: fields.timestamp("CreationDate")?,
            post_id: fields.int_or_zero("PostId"),
            related_post_id: fields.int_or_zero("RelatedPostId"),
            link_type_id: fields.int_or_zero("LinkTypeId"),
        })
    }

    fn bind(self, query: PgQuery<'_>) -> PgQuery<'_> {
        query
            .bind(self.id)
            .bind(self.creation_date)
            .bind(self.post_id)
            .bind(self.related_post_id)
            .bind(self.link_type_id)
    }
}
