use chirp_common::model::{
    ModelValidationError,
    user::{Author, UserId, Username},
};
use serde::Deserialize;

/// A user as returned by the identity provider.
///
/// Only the fields needed for display are read, everything else the
/// provider sends is ignored. Newer provider versions send the picture as
/// `image_url` alongside the older `profile_image_url`.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub username: Option<String>,
    #[serde(default)]
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl TryFrom<UserRecord> for Author {
    type Error = ModelValidationError;

    fn try_from(value: UserRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::new(value.id)?,
            username: value.username.map(Username::from_directory),
            profile_picture: value
                .profile_image_url
                .or(value.image_url)
                .unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::record::UserRecord;
    use chirp_common::model::{ModelValidationError, user::Author};

    #[test]
    fn projects_provider_user() {
        let record: UserRecord = serde_json::from_value(serde_json::json!({
            "id": "user_2NNEqL2nrIRdJ194ndJqAHwEfxC",
            "object": "user",
            "username": "alice",
            "first_name": "Alice",
            "email_addresses": [{"email_address": "alice@example.com"}],
            "profile_image_url": "https://img.example.com/alice.png",
            "image_url": "https://img.example.com/proxy/alice.png",
            "created_at": 1_700_000_000_000_u64,
        }))
        .unwrap();

        let author = Author::try_from(record).unwrap();

        assert_eq!(author.id.get(), "user_2NNEqL2nrIRdJ194ndJqAHwEfxC");
        assert_eq!(author.username.unwrap().get(), "alice");
        assert_eq!(author.profile_picture, "https://img.example.com/alice.png");
    }

    #[test]
    fn username_may_be_null() {
        let record: UserRecord = serde_json::from_value(serde_json::json!({
            "id": "user_1",
            "username": null,
            "image_url": "https://img.example.com/1.png",
        }))
        .unwrap();

        let author = Author::try_from(record).unwrap();

        assert!(author.username.is_none());
        assert_eq!(author.profile_picture, "https://img.example.com/1.png");
    }

    #[test]
    fn long_username_is_kept() {
        let record = UserRecord {
            id: "user_1".to_owned(),
            username: Some("a".repeat(65)),
            profile_image_url: Some("https://img.example.com/1.png".to_owned()),
            image_url: None,
        };

        let author = Author::try_from(record).unwrap();

        assert_eq!(author.username.unwrap().get(), "a".repeat(65));
    }

    #[test]
    fn invalid_id_is_rejected() {
        let record = UserRecord {
            id: String::new(),
            username: None,
            profile_image_url: None,
            image_url: None,
        };

        assert!(matches!(
            Author::try_from(record),
            Err(ModelValidationError::UserId(_))
        ));
    }
}
