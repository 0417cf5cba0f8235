use chrono::NaiveDateTime;

use super::{ConflictPolicy, EntityKind, EntityRecord, PgQuery};
use crate::coerce::{CoercionError, Fields};

/// Foreign keys on `posts`, dropped before loading so rows can arrive in any
/// order. The referential repair pass cleans up what they would have caught.
pub const POST_CONSTRAINTS: [&str; 4] = [
    "fk_posts_accepted_answer_id",
    "fk_posts_parent_id",
    "fk_posts_owner_user_id",
    "fk_posts_last_editor_user_id",
];

const DROP_CONSTRAINTS_SQL: &str = "\
ALTER TABLE posts DROP CONSTRAINT IF EXISTS fk_posts_accepted_answer_id;
ALTER TABLE posts DROP CONSTRAINT IF EXISTS fk_posts_parent_id;
ALTER TABLE posts DROP CONSTRAINT IF EXISTS fk_posts_owner_user_id;
ALTER TABLE posts DROP CONSTRAINT IF EXISTS fk_posts_last_editor_user_id;";

/// A row of `Posts.xml`, either a question (type 1) or an answer (type 2)
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: i64,
    pub post_type_id: i64,
    pub accepted_answer_id: Option<i64>,
    pub creation_date: NaiveDateTime,
    pub score: i64,
    pub view_count: Option<i64>,
    pub body: String,
    pub owner_user_id: Option<i64>,
    pub last_editor_user_id: Option<i64>,
    pub last_edit_date: Option<NaiveDateTime>,
    pub last_activity_date: Option<NaiveDateTime>,
    pub title: String,
    /// Concatenated `<tag>` tokens, empty for answers
    pub tags: String,
    pub answer_count: i64,
    pub comment_count: i64,
    pub favorite_count: i64,
    pub closed_date: Option<NaiveDateTime>,
    pub parent_id: Option<i64>,
    pub community_owned_date: Option<NaiveDateTime>,
}

impl EntityRecord for Post {
    const KIND: EntityKind = EntityKind::Posts;

    const COLUMNS: &'static [&'static str] = &[
        "id",
        "post_type_id",
        "accepted_answer_id",
        "creation_date",
        "score",
        "view_count",
        "body",
        "owner_user_id",
        "last_editor_user_id",
        "last_edit_date",
        "last_activity_date",
        "title",
        "tags",
        "answer_count",
        "comment_count",
        "favorite_count",
        "closed_date",
        "parent_id",
        "community_owned_date",
    ];

    const CONFLICT: ConflictPolicy =
        ConflictPolicy::Update(&["score", "view_count", "answer_count"]);

    const PRE_LOAD_SQL: Option<&'static str> = Some(DROP_CONSTRAINTS_SQL);

    fn from_fields(fields: &Fields<'_>) -> Result<Self, CoercionError> {
        Ok(Self {
            id: fields.int_or_zero("Id"),
            post_type_id: fields.int_or_zero("PostTypeId"),
            accepted_answer_id: fields.nullable_int("AcceptedAnswerId")?,
            creation_date: fields.timestamp("CreationDate")?,
            score: fields.int_or_zero("Score"),
            view_count: fields.nullable_int("ViewCount")?,
            body: fields.text("Body"),
            owner_user_id: fields.nullable_int("OwnerUserId")?,
            last_editor_user_id: fields.nullable_int("LastEditorUserId")?,
            last_edit_date: fields.nullable_timestamp("LastEditDate")?,
            last_activity_date: fields.nullable_timestamp("LastActivityDate")?,
            title: fields.text("Title"),
            tags: fields.text("Tags"),
            answer_count: fields.int_or_zero("AnswerCount"),
            comment_count: fields.int_or_zero("CommentCount"),
            favorite_count: fields.int_or_zero("FavoriteCount"),
            closed_date: fields.nullable_timestamp("ClosedDate")?,
            parent_id: fields.nullable_int("ParentId")?,
            community_owned_date: fields.nullable_timestamp("CommunityOwnedDate")?,
        })
    }

    fn bind(self, query: PgQuery<'_>) -> PgQuery<'_> {
        query
            .bind(self.id)
            .bind(self.post_type_id)
            .bind(self.accepted_answer_id)
            .bind(self.creation_date)
            .bind(self.score)
            .bind(self.view_count)
            .bind(self.body)
            .bind(self.owner_user_id)
            .bind(self.last_editor_user_id)
            .bind(self.last_edit_date)
            .bind(self.last_activity_date)
            .bind(self.title)
            .bind(self.tags)
            .bind(self.answer_count)
            .bind(self.comment_count)
            .bind(self.favorite_count)
            .bind(self.closed_date)
            .bind(self.parent_id)
            .bind(self.community_owned_date)
    }
}
