use crate::server::{Result, ServerError, ServerRouter, ServerState, json::Json};
use axum::extract::State;
use axum_extra::routing::{RouterExt, TypedPath};
use chirp_common::{
    feed::{IdentityDirectory, PostStore},
    model::user::{Author, Username},
};
use serde::Deserialize;

pub fn routes<P, D>() -> ServerRouter<P, D>
where
    P: PostStore + 'static,
    D: IdentityDirectory + 'static,
{
    ServerRouter::new().typed_get(get_profile::<P, D>)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/profiles/{username}", rejection(ServerError))]
struct GetProfilePath {
    username: Username,
}

async fn get_profile<P, D>(
    GetProfilePath { username }: GetProfilePath,
    State(state): State<ServerState<P, D>>,
) -> Result<Json<Author>>
where
    P: PostStore,
    D: IdentityDirectory,
{
    // Profile links are rendered as `@username`.
    let username = match username.get().strip_prefix('@') {
        Some(stripped) => Username::new(stripped.to_owned()).unwrap_or(username),
        None => username,
    };

    let author_option = state
        .directory
        .find_user_by_username(&username)
        .await
        .map_err(|err| ServerError::IdentityDirectory(Box::new(err)))?;
    let author = author_option.ok_or(ServerError::ProfileByUsernameNotFound(username))?;

    Ok(Json(author))
}
