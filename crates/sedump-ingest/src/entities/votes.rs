use chrono::NaiveDateTime;

use super::{ConflictPolicy, EntityKind, EntityRecord, PgQuery};
use crate::coerce::{CoercionError, Fields};

/// A row of `Votes.xml`
#[derive(Debug, Clone, PartialEq)]
pub struct Vote {
    pub id: i64,
    pub post_id: i64,
    pub vote_type_id: i64,
    pub user_id: Option<i64>,
    pub creation_date: NaiveDateTime,
    pub bounty_amount: Option<i64>,
}

impl EntityRecord for Vote {
    const KIND: EntityKind = EntityKind::Votes;

    const COLUMNS: &'static [&'static str] = &[
        "id",
        "post_id",
        "vote_type_id",
        "user_id",
        "creation_date",
        "bounty_amount",
    ];

    const CONFLICT: ConflictPolicy = ConflictPolicy::Ignore;

    fn from_fields(fields: &Fields<'_>) -> Result<Self, CoercionError> {
        Ok(Self {
            id: fields.int_or_zero("Id"),
            post_id: fields.int_or_zero("PostId"),
            vote_type_id: fields.int_or_zero("VoteTypeId"),
            user_id: fields.nullable_int("UserId")?,
            creation_date: fields.timestamp("CreationDate")?,
            bounty_amount: fields.nullable_int("BountyAmount")?,
        })
    }

    fn bind(self, query: PgQuery<'_>) -> PgQuery<'_> {
        query
            .bind(self.id)
            .bind(self.post_id)
            .bind(self.vote_type_id)
            .bind(self.user_id)
            .bind(self.creation_date)
            .bind(self.bounty_amount)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::decoder::Attributes;

    #[test]
    fn test_bounty_vote() {
        let attributes: Attributes = [
            ("Id", "77"),
            ("PostId", "12"),
            ("VoteTypeId", "8"),
            ("UserId", "4"),
            ("CreationDate", "2014-02-11T00:00:00.000"),
            ("BountyAmount", "50"),
        ]
        .into_iter()
        .collect();

        let vote = Vote::from_fields(&Fields::new(&attributes)).unwrap();
        assert_eq!(vote.bounty_amount, Some(50));
        assert_eq!(vote.user_id, Some(4));
    }

    #[test]
    fn test_malformed_bounty_is_rejected() {
        let attributes: Attributes = [
            ("Id", "78"),
            ("PostId", "12"),
            ("CreationDate", "2014-02-11T00:00:00.000"),
            ("BountyAmount", "fifty"),
        ]
        .into_iter()
        .collect();

        let err = Vote::from_fields(&Fields::new(&attributes)).unwrap_err();
        assert_eq!(err.field, "BountyAmount");
    }
}
