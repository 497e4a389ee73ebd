use crate::server::{Result, ServerError, ServerRouter, ServerState, json::Json};
use axum::extract::State;
use axum_extra::routing::{RouterExt, TypedPath};
use chirp_common::{
    feed::{self, IdentityDirectory, PostStore},
    model::{Id, feed::FeedItem, post::PostMarker},
};
use serde::Deserialize;

pub fn routes<P, D>() -> ServerRouter<P, D>
where
    P: PostStore + 'static,
    D: IdentityDirectory + 'static,
{
    ServerRouter::new()
        .typed_get(get_feed::<P, D>)
        .typed_get(get_post::<P, D>)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts", rejection(ServerError))]
struct GetFeedPath();

async fn get_feed<P, D>(
    GetFeedPath(): GetFeedPath,
    State(state): State<ServerState<P, D>>,
) -> Result<Json<Vec<FeedItem>>>
where
    P: PostStore,
    D: IdentityDirectory,
{
    let feed = feed::assemble_feed(&*state.posts, &*state.directory).await?;

    Ok(Json(feed))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/{id}", rejection(ServerError))]
struct GetPostPath {
    id: Id<PostMarker>,
}

async fn get_post<P, D>(
    GetPostPath { id }: GetPostPath,
    State(state): State<ServerState<P, D>>,
) -> Result<Json<FeedItem>>
where
    P: PostStore,
    D: IdentityDirectory,
{
    let item = feed::assemble_post(&*state.posts, &*state.directory, id)
        .await?
        .ok_or(ServerError::PostByIdNotFound(id))?;

    Ok(Json(item))
}
