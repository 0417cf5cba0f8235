use chrono::NaiveDateTime;

use super::{ConflictPolicy, EntityKind, EntityRecord, PgQuery};
use crate::coerce::{CoercionError, Fields};

/// A row of `Comments.xml`
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub user_id: Option<i64>,
    pub score: i64,
    pub text: String,
    pub creation_date: NaiveDateTime,
}

impl EntityRecord for Comment {
    const KIND: EntityKind = EntityKind::Comments;

    const COLUMNS: &'static [&'static str] =
        &["id", "post_id", "user_id", "score", "text", "creation_date"];

    const CONFLICT: ConflictPolicy = ConflictPolicy::Ignore;

    fn from_fields(fields: &Fields<'_>) -> Result<Self, CoercionError> {
        Ok(Self {
            id: fields.int_or_zero("Id"),
            post_id: fields.int_or_zero("PostId"),
            user_id: fields.nullable_int("UserId")?,
            score: fields.int_or_zero("Score"),
            text: fields.text("Text"),
            creation_date: fields.timestamp("CreationDate")?,
        })
    }

    fn bind(self, query: PgQuery<'_>) -> PgQuery<'_> {
        query
            .bind(self.id)
            .bind(self.post_id)
            .bind(self.user_id)
            .bind(self.score)
            .bind(self.text)
            .bind(self.creation_date)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::decoder::Attributes;

    #[test]
    fn test_anonymous_comment() {
        let attributes: Attributes = [
            ("Id", "10"),
            ("PostId", "3"),
            ("Score", "2"),
            ("Text", "Have you tried VACUUM?"),
            ("CreationDate", "2011-01-03T20:52:52.880"),
        ]
        .into_iter()
        .collect();

        let comment = Comment::from_fields(&Fields::new(&attributes)).unwrap();
        assert_eq!(comment.post_id, 3);
        assert_eq!(comment.user_id, None);
        assert_eq!(comment.text, "Have you tried VACUUM?");
    }
}
