use axum::{
    Router,
    extract::{Request, rejection::PathRejection},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use chirp_common::{
    feed::{BoxError, FeedError, FeedErrorKind, IdentityDirectory, PostStore},
    model::{Id, post::PostMarker, user::Username},
};
use json::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

mod json;
mod routes;

pub type ServerRouter<P, D> = Router<ServerState<P, D>>;

/// Handles to the post store and the identity directory shared by all
/// requests.
#[derive(Debug)]
pub struct ServerState<P, D> {
    pub posts: Arc<P>,
    pub directory: Arc<D>,
}

impl<P, D> ServerState<P, D> {
    #[must_use]
    pub fn new(posts: P, directory: D) -> Self {
        Self {
            posts: Arc::new(posts),
            directory: Arc::new(directory),
        }
    }
}

impl<P, D> Clone for ServerState<P, D> {
    fn clone(&self) -> Self {
        Self {
            posts: Arc::clone(&self.posts),
            directory: Arc::clone(&self.directory),
        }
    }
}

pub fn routes<P, D>() -> ServerRouter<P, D>
where
    P: PostStore + 'static,
    D: IdentityDirectory + 'static,
{
    routes::routes().fallback(fallback)
}

pub async fn fallback(request: Request) -> ServerError {
    ServerError::UnknownRoute(request.into_parts().0.uri)
}

pub type Result<T, E = ServerError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Unknown route requested: {0}")]
    UnknownRoute(Uri),
    #[error("Path rejected: {0}")]
    PathRejection(#[from] PathRejection),
    #[error("JSON response could not be serialized: {0}")]
    JsonResponse(#[from] serde_json::Error),
    #[error(transparent)]
    Feed(#[from] FeedError),
    #[error("Reading profile failed: {0}")]
    IdentityDirectory(#[source] BoxError),
    #[error("Post with id {0} was not found.")]
    PostByIdNotFound(Id<PostMarker>),
    #[error("Profile with username {0} was not found.")]
    ProfileByUsernameNotFound(Username),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::UnknownRoute(_)
            | ServerError::PathRejection(_)
            | ServerError::PostByIdNotFound(_)
            | ServerError::ProfileByUsernameNotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Feed(err) => match err.kind() {
                FeedErrorKind::UpstreamReadFailure => StatusCode::BAD_GATEWAY,
                FeedErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ServerError::IdentityDirectory(_) => StatusCode::BAD_GATEWAY,
            ServerError::JsonResponse(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
struct ErrorResponse {
    status: u16,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();

        error!(error = %self, %status, "Replying with error");

        let error_response = ErrorResponse {
            status: status.as_u16(),
        };
        (status, Json(error_response)).into_response()
    }
}
