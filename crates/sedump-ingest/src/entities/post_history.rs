use chrono::NaiveDateTime;

use super::{ConflictPolicy, EntityKind, EntityRecord, PgQuery};
use crate::coerce::{CoercionError, Fields};

/// A row of `PostHistory.xml`
#[derive(Debug, Clone, PartialEq)]
pub struct PostHistory {
    pub id: i64,
    pub post_id: i64,
    pub user_id: Option<i64>,
    pub post_history_type_id: i64,
    pub revision_guid: String,
    pub creation_date: NaiveDateTime,
    pub text: String,
    pub comment: String,
}

impl EntityRecord for PostHistory {
    const KIND: EntityKind = EntityKind::PostHistory;

    const COLUMNS: &'static [&'static str] = &[
        "id",
        "post_id",
        "user_id",
        "post_history_type_id",
        "revision_guid",
        "creation_date",
        "text",
        "comment",
    ];

    const CONFLICT: ConflictPolicy = ConflictPolicy::Ignore;

    fn from_fields(fields: &Fields<'_>) -> Result<Self, CoercionError> {
        Ok(Self {
            id: fields.int_or_zero("Id"),
            post_id: fields.int_or_zero("PostId"),
            user_id: fields.nullable_int("UserId")?,
            post_history_type_id: fields.int_or_zero("PostHistoryTypeId"),
            revision_guid: fields.text("RevisionGUID"),
            creation_date: fields.timestamp("CreationDate")?,
            text: fields.text("Text"),
            comment: fields.text("Comment"),
        })
    }

    fn bind(self, query: PgQuery<'_>) -> PgQuery<'_> {
        query
            .bind(self.id)
            .bind(self.post_id)
            .bind(self.user_id)
            .bind(self.post_history_type_id)
            .bind(self.revision_guid)
            .bind(self.creation_date)
            .bind(self.text)
            .bind(self.comment)
    }
}
