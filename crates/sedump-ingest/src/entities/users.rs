use chrono::NaiveDateTime;

use super::{ConflictPolicy, EntityKind, EntityRecord, PgQuery};
use crate::coerce::{CoercionError, Fields};

/// A row of `Users.xml`
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub reputation: i64,
    pub display_name: String,
    pub about_me: String,
    pub website_url: String,
    pub location: String,
    pub creation_date: NaiveDateTime,
    pub last_access_date: Option<NaiveDateTime>,
    pub views: i64,
    pub up_votes: i64,
    pub down_votes: i64,
    pub account_id: Option<i64>,
}

impl EntityRecord for User {
    const KIND: EntityKind = EntityKind::Users;

    const COLUMNS: &'static [&'static str] = &[
        "id",
        "reputation",
        "display_name",
        "about_me",
        "website_url",
        "location",
        "creation_date",
        "last_access_date",
        "views",
        "up_votes",
        "down_votes",
        "account_id",
    ];

    const CONFLICT: ConflictPolicy = ConflictPolicy::Update(&["reputation", "display_name"]);

    fn from_fields(fields: &Fields<'_>) -> Result<Self, CoercionError> {
        Ok(Self {
            id: fields.int_or_zero("Id"),
            reputation: fields.int_or_zero("Reputation"),
            display_name: fields.text("DisplayName"),
            about_me: fields.text("AboutMe"),
            website_url: fields.text("WebsiteUrl"),
            location: fields.text("Location"),
            creation_date: fields.timestamp("CreationDate")?,
            last_access_date: fields.nullable_timestamp("LastAccessDate")?,
            views: fields.int_or_zero("Views"),
            up_votes: fields.int_or_zero("UpVotes"),
            down_votes: fields.int_or_zero("DownVotes"),
            account_id: fields.nullable_int("AccountId")?,
        })
    }

    fn bind(self, query: PgQuery<'_>) -> PgQuery<'_> {
        query
            .bind(self.id)
            .bind(self.reputation)
            .bind(self.display_name)
            .bind(self.about_me)
            .bind(self.website_url)
            .bind(self.location)
            .bind(self.creation_date)
            .bind(self.last_access_date)
            .bind(self.views)
            .bind(self.up_votes)
            .bind(self.down_votes)
            .bind(self.account_id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::decoder::Attributes;

    #[test]
    fn test_community_user_without_optional_fields() {
        let attributes: Attributes = [
            ("Id", "-1"),
            ("Reputation", "1"),
            ("CreationDate", "2009-04-30T07:08:47.383"),
            ("DisplayName", "Community"),
        ]
        .into_iter()
        .collect();

        let user = User::from_fields(&Fields::new(&attributes)).unwrap();
        assert_eq!(user.id, -1);
        assert_eq!(user.display_name, "Community");
        assert_eq!(user.about_me, "");
        assert_eq!(user.views, 0);
        assert_eq!(user.last_access_date, None);
        assert_eq!(user.account_id, None);
    }

    #[test]
    fn test_user_requires_creation_date() {
        let attributes: Attributes = [("Id", "5"), ("DisplayName", "Ann")].into_iter().collect();
        let err = User::from_fields(&Fields::new(&attributes)).unwrap_err();
        assert_eq!(err.field, "CreationDate");
    }
}
