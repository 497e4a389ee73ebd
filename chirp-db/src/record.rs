use chirp_common::model::{ModelValidationError, post::Post, user::UserId};
use sqlx::FromRow;
use time::OffsetDateTime;

#[derive(Clone, Eq, PartialEq, Debug, Hash, FromRow)]
pub(crate) struct PostRecord {
    pub post_snowflake: i64,
    pub author_id: String,
    pub content: String,
    pub created_at: OffsetDateTime,
}

impl TryFrom<PostRecord> for Post {
    type Error = ModelValidationError;

    fn try_from(value: PostRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.post_snowflake.cast_unsigned().into(),
            author_id: UserId::new(value.author_id)?,
            content: value.content,
            created_at: value.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::record::PostRecord;
    use chirp_common::model::{Id, ModelValidationError, post::Post};
    use time::macros::datetime;

    fn record(author_id: &str) -> PostRecord {
        PostRecord {
            post_snowflake: -1,
            author_id: author_id.to_owned(),
            content: "hi".to_owned(),
            created_at: datetime!(2025-03-04 05:06 UTC),
        }
    }

    #[test]
    fn post_from_record() {
        let post = Post::try_from(record("user_1")).unwrap();

        // Snowflakes are stored as signed BIGINT and reinterpreted bitwise.
        assert_eq!(post.id, Id::new(u64::MAX));
        assert_eq!(post.author_id.get(), "user_1");
        assert_eq!(post.content, "hi");
        assert_eq!(post.created_at, datetime!(2025-03-04 05:06 UTC));
    }

    #[test]
    fn invalid_author_id_is_a_data_error() {
        assert!(matches!(
            Post::try_from(record("")),
            Err(ModelValidationError::UserId(_))
        ));
    }
}
