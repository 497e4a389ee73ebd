use crate::server::ServerRouter;
use chirp_common::feed::{IdentityDirectory, PostStore};

mod posts;
mod profiles;
mod users;

pub fn routes<P, D>() -> ServerRouter<P, D>
where
    P: PostStore + 'static,
    D: IdentityDirectory + 'static,
{
    ServerRouter::new()
        .merge(posts::routes())
        .merge(users::routes())
        .merge(profiles::routes())
}
