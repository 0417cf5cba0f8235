use chrono::NaiveDateTime;

use super::{ConflictPolicy, EntityKind, EntityRecord, PgQuery};
use crate::coerce::{CoercionError, Fields};

/// A row of `Badges.xml`
#[derive(Debug, Clone, PartialEq)]
pub struct Badge {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub date: NaiveDateTime,
    /// 1 gold, 2 silver, 3 bronze
    pub class: i64,
    pub tag_based: bool,
}

impl EntityRecord for Badge {
    const KIND: EntityKind = EntityKind::Badges;

    const COLUMNS: &'static [&'static str] =
        &["id", "user_id", "name", "date", "class", "tag_based"];

    const CONFLICT: ConflictPolicy = ConflictPolicy::Ignore;

    fn from_fields(fields: &Fields<'_>) -> Result<Self, CoercionError> {
        Ok(Self {
            id: fields.int_or_zero("Id"),
            user_id: fields.int_or_zero("UserId"),
            name: fields.text("Name"),
            date: fields.timestamp("Date")?,
            class: fields.int_or_zero("Class"),
            tag_based: fields.flag("TagBased"),
        })
    }

    fn bind(self, query: PgQuery<'_>) -> PgQuery<'_> {
        query
            .bind(self.id)
            .bind(self.user_id)
            .bind(self.name)
            .bind(self.date)
            .bind(self.class)
            .bind(self.tag_based)
    }
}
