use crate::server::{Result, ServerError, ServerRouter, ServerState, json::Json};
use axum::extract::State;
use axum_extra::routing::{RouterExt, TypedPath};
use chirp_common::{
    feed::{self, IdentityDirectory, PostStore},
    model::{feed::FeedItem, user::UserId},
};
use serde::Deserialize;

pub fn routes<P, D>() -> ServerRouter<P, D>
where
    P: PostStore + 'static,
    D: IdentityDirectory + 'static,
{
    ServerRouter::new().typed_get(get_user_posts::<P, D>)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/users/{id}/posts", rejection(ServerError))]
struct GetUserPostsPath {
    id: UserId,
}

async fn get_user_posts<P, D>(
    GetUserPostsPath { id }: GetUserPostsPath,
    State(state): State<ServerState<P, D>>,
) -> Result<Json<Vec<FeedItem>>>
where
    P: PostStore,
    D: IdentityDirectory,
{
    let posts = feed::assemble_author_feed(&*state.posts, &*state.directory, &id).await?;

    Ok(Json(posts))
}
