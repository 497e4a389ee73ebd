//! Assembly of author-enriched post feeds.
//!
//! Posts and user profiles live in two independent systems with no
//! referential integrity between them. A feed is built with exactly two
//! reads (posts, then one batch of authors) and an in-memory join that
//! fails as a whole if any post references an author the directory does
//! not know.

use crate::model::{
    Id,
    feed::FeedItem,
    post::{Post, PostMarker},
    user::{Author, UserId, Username},
};
use std::{collections::HashMap, error::Error as StdError};
use thiserror::Error;

/// Upper bound for posts in a feed and for ids in one batch author lookup.
pub const FEED_LIMIT: usize = 100;

pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

pub trait PostStore: Send + Sync {
    type Error: StdError + Send + Sync + 'static;

    /// Returns at most `limit` posts, newest first.
    fn list_posts(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Post>, Self::Error>> + Send;

    /// Returns at most `limit` posts written by `author`, newest first.
    fn list_posts_by_author(
        &self,
        author: &UserId,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Post>, Self::Error>> + Send;

    fn fetch_post(
        &self,
        id: Id<PostMarker>,
    ) -> impl Future<Output = Result<Option<Post>, Self::Error>> + Send;
}

pub trait IdentityDirectory: Send + Sync {
    type Error: StdError + Send + Sync + 'static;

    /// Resolves many user ids with a single request. Unknown ids are
    /// simply missing from the result. `ids` may contain duplicates.
    fn get_users_by_ids(
        &self,
        ids: &[UserId],
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Author>, Self::Error>> + Send;

    fn find_user_by_username(
        &self,
        username: &Username,
    ) -> impl Future<Output = Result<Option<Author>, Self::Error>> + Send;
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub enum FeedErrorKind {
    /// One of the two backing reads failed.
    UpstreamReadFailure,
    /// The two backing systems disagree with each other.
    Internal,
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Reading posts failed: {0}")]
    PostStore(#[source] BoxError),
    #[error("Reading authors failed: {0}")]
    IdentityDirectory(#[source] BoxError),
    #[error("Author for post not found. Post id: {post_id}, user id: {author_id}")]
    AuthorNotFound {
        post_id: Id<PostMarker>,
        author_id: UserId,
    },
}

impl FeedError {
    #[must_use]
    pub fn kind(&self) -> FeedErrorKind {
        match self {
            FeedError::PostStore(_) | FeedError::IdentityDirectory(_) => {
                FeedErrorKind::UpstreamReadFailure
            }
            FeedError::AuthorNotFound { .. } => FeedErrorKind::Internal,
        }
    }

    fn post_store(err: impl StdError + Send + Sync + 'static) -> Self {
        FeedError::PostStore(Box::new(err))
    }

    fn identity_directory(err: impl StdError + Send + Sync + 'static) -> Self {
        FeedError::IdentityDirectory(Box::new(err))
    }
}

/// Builds the global feed from the newest [`FEED_LIMIT`] posts.
pub async fn assemble_feed<P, D>(posts: &P, directory: &D) -> Result<Vec<FeedItem>, FeedError>
where
    P: PostStore,
    D: IdentityDirectory,
{
    let posts = posts
        .list_posts(FEED_LIMIT)
        .await
        .map_err(FeedError::post_store)?;

    join_authors(posts, directory).await
}

/// Builds the feed of a single author.
pub async fn assemble_author_feed<P, D>(
    posts: &P,
    directory: &D,
    author: &UserId,
) -> Result<Vec<FeedItem>, FeedError>
where
    P: PostStore,
    D: IdentityDirectory,
{
    let posts = posts
        .list_posts_by_author(author, FEED_LIMIT)
        .await
        .map_err(FeedError::post_store)?;

    join_authors(posts, directory).await
}

pub async fn assemble_post<P, D>(
    posts: &P,
    directory: &D,
    id: Id<PostMarker>,
) -> Result<Option<FeedItem>, FeedError>
where
    P: PostStore,
    D: IdentityDirectory,
{
    let Some(post) = posts.fetch_post(id).await.map_err(FeedError::post_store)? else {
        return Ok(None);
    };

    Ok(join_authors(vec![post], directory).await?.pop())
}

/// Pairs every post with its author, keeping the order of `posts`.
///
/// The directory is queried once for all authors. A single unresolved
/// author fails the whole join.
pub async fn join_authors<D>(posts: Vec<Post>, directory: &D) -> Result<Vec<FeedItem>, FeedError>
where
    D: IdentityDirectory,
{
    if posts.is_empty() {
        return Ok(Vec::new());
    }

    let author_ids: Vec<UserId> = posts
        .iter()
        .take(FEED_LIMIT)
        .map(|post| post.author_id.clone())
        .collect();

    let authors: HashMap<UserId, Author> = directory
        .get_users_by_ids(&author_ids, FEED_LIMIT)
        .await
        .map_err(FeedError::identity_directory)?
        .into_iter()
        .map(|author| (author.id.clone(), author))
        .collect();

    posts
        .into_iter()
        .map(|post| match authors.get(&post.author_id) {
            Some(author) => Ok(FeedItem {
                author: author.clone(),
                post,
            }),
            None => Err(FeedError::AuthorNotFound {
                post_id: post.id,
                author_id: post.author_id,
            }),
        })
        .collect()
}
