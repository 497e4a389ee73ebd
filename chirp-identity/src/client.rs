use crate::record::UserRecord;
use chirp_common::{
    feed::IdentityDirectory,
    model::user::{Author, UserId, Username},
};
use reqwest::{Client, StatusCode};
use std::{
    fmt::{Debug, Formatter},
    time::Duration,
};
use thiserror::Error;
use tracing::{debug, warn};

/// Upper bound for a whole request to the provider, body included.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub type Result<T, E = IdentityError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Request to the identity provider failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Identity provider replied with {status}: {body}")]
    Status { status: StatusCode, body: String },
}

/// Read-only client for the identity provider's user directory.
#[derive(Clone)]
pub struct IdentityClient {
    client: Client,
    base_url: String,
    secret_key: String,
}

impl IdentityClient {
    pub fn new(base_url: &str, secret_key: String) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::with_client(client, base_url, secret_key))
    }

    #[must_use]
    pub fn with_client(client: Client, base_url: &str, secret_key: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            secret_key,
        }
    }

    fn users_url(&self) -> String {
        format!("{}/v1/users", self.base_url)
    }

    async fn list_users(&self, query: &[(&str, String)]) -> Result<Vec<Author>> {
        let response = self
            .client
            .get(self.users_url())
            .bearer_auth(&self.secret_key)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(err) => {
                    debug!(error = %err, %status, "Could not read error body");
                    String::new()
                }
            };
            return Err(IdentityError::Status { status, body });
        }

        let records: Vec<UserRecord> = response.json().await?;
        // A record without a usable id can never be matched to a post, so it
        // is dropped instead of failing the whole batch.
        let authors = records
            .into_iter()
            .filter_map(|record| match Author::try_from(record) {
                Ok(author) => Some(author),
                Err(err) => {
                    warn!(error = %err, "Skipping invalid user from identity provider");
                    None
                }
            })
            .collect();
        Ok(authors)
    }

    pub async fn get_users_by_ids(&self, ids: &[UserId], limit: usize) -> Result<Vec<Author>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        debug!(ids = ids.len(), limit, "Fetching users by id");
        self.list_users(&users_by_ids_query(ids, limit)).await
    }

    pub async fn find_user_by_username(&self, username: &Username) -> Result<Option<Author>> {
        debug!(%username, "Fetching user by username");
        let users = self.list_users(&user_by_username_query(username)).await?;

        // The provider matches usernames case-insensitively.
        Ok(users.into_iter().find(|user| {
            user.username
                .as_ref()
                .is_some_and(|found| found.get().eq_ignore_ascii_case(username.get()))
        }))
    }
}

fn users_by_ids_query(ids: &[UserId], limit: usize) -> Vec<(&'static str, String)> {
    ids.iter()
        .take(limit)
        .map(|id| ("user_id", id.get().to_owned()))
        .chain([("limit", limit.to_string())])
        .collect()
}

fn user_by_username_query(username: &Username) -> Vec<(&'static str, String)> {
    vec![
        ("username", username.get().to_owned()),
        ("limit", "1".to_owned()),
    ]
}

impl Debug for IdentityClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityClient")
            .field("base_url", &self.base_url)
            .field("secret_key", &"[redacted]")
            .finish_non_exhaustive()
    }
}

impl IdentityDirectory for IdentityClient {
    type Error = IdentityError;

    async fn get_users_by_ids(&self, ids: &[UserId], limit: usize) -> Result<Vec<Author>> {
        IdentityClient::get_users_by_ids(self, ids, limit).await
    }

    async fn find_user_by_username(&self, username: &Username) -> Result<Option<Author>> {
        IdentityClient::find_user_by_username(self, username).await
    }
}
