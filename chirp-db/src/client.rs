use crate::record::PostRecord;
use chirp_common::{
    feed::PostStore,
    model::{
        Id, ModelValidationError,
        post::{Post, PostMarker},
        user::UserId,
    },
};
use sqlx::{PgPool, migrate::MigrateError, query_as};
use thiserror::Error;

pub type Result<T, E = DbError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("An object in the database was invalid: {0}")]
    Data(#[from] ModelValidationError),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error("Running migrations failed: {0}")]
    Migrate(#[from] MigrateError),
}

#[derive(Clone, Debug)]
pub struct DbClient {
    pool: PgPool,
}

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

impl DbClient {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub async fn list_posts(&self, limit: usize) -> Result<Vec<Post>> {
        let records = query_as::<_, PostRecord>(
            "
            SELECT
                posts.post_snowflake,
                posts.author_id,
                posts.content,
                posts.created_at
            FROM
                posts.posts
            ORDER BY
                posts.created_at DESC,
                posts.post_snowflake DESC
            LIMIT $1
            ",
        )
        .bind(sql_limit(limit))
        .fetch_all(&self.pool)
        .await?;

        let posts = records
            .into_iter()
            .map(Post::try_from)
            .collect::<Result<_, _>>()?;
        Ok(posts)
    }

    pub async fn list_posts_by_author(&self, author: &UserId, limit: usize) -> Result<Vec<Post>> {
        let records = query_as::<_, PostRecord>(
            "
            SELECT
                posts.post_snowflake,
                posts.author_id,
                posts.content,
                posts.created_at
            FROM
                posts.posts
            WHERE
                posts.author_id = $1
            ORDER BY
                posts.created_at DESC,
                posts.post_snowflake DESC
            LIMIT $2
            ",
        )
        .bind(author.get())
        .bind(sql_limit(limit))
        .fetch_all(&self.pool)
        .await?;

        let posts = records
            .into_iter()
            .map(Post::try_from)
            .collect::<Result<_, _>>()?;
        Ok(posts)
    }

    pub async fn fetch_post(&self, post_id: Id<PostMarker>) -> Result<Option<Post>> {
        let record = query_as::<_, PostRecord>(
            "
            SELECT
                posts.post_snowflake,
                posts.author_id,
                posts.content,
                posts.created_at
            FROM
                posts.posts
            WHERE
                posts.post_snowflake = $1
            ",
        )
        .bind(post_id.get().cast_signed())
        .fetch_optional(&self.pool)
        .await?;

        let post = record.map(Post::try_from).transpose()?;
        Ok(post)
    }
}

impl PostStore for DbClient {
    type Error = DbError;

    async fn list_posts(&self, limit: usize) -> Result<Vec<Post>> {
        DbClient::list_posts(self, limit).await
    }

    async fn list_posts_by_author(&self, author: &UserId, limit: usize) -> Result<Vec<Post>> {
        DbClient::list_posts_by_author(self, author, limit).await
    }

    async fn fetch_post(&self, id: Id<PostMarker>) -> Result<Option<Post>> {
        DbClient::fetch_post(self, id).await
    }
}

#[cfg(test)]
mod tests {
    use crate::client::sql_limit;

    #[test]
    fn limit_saturates() {
        assert_eq!(sql_limit(100), 100);
        assert_eq!(sql_limit(usize::MAX), i64::MAX);
    }
}
