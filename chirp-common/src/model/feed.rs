use crate::model::{post::Post, user::Author};
use serde::{Deserialize, Serialize};

/// A post together with its resolved author.
///
/// `author.id` is always equal to `post.author_id`.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct FeedItem {
    pub post: Post,
    pub author: Author,
}
