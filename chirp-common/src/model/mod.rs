pub mod feed;
pub mod post;
pub mod user;

use crate::model::user::{InvalidUserIdError, InvalidUsernameError};
use derive_where::derive_where;
use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter},
    marker::PhantomData,
    num::ParseIntError,
    str::FromStr,
};
use thiserror::Error;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Error)]
pub enum ModelValidationError {
    #[error(transparent)]
    UserId(#[from] InvalidUserIdError),
    #[error(transparent)]
    Username(#[from] InvalidUsernameError),
}

/// Numeric id of a locally stored object, tagged with a marker type so
/// ids of different kinds cannot be mixed up.
#[derive_where(
    Copy,
    Clone,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Debug,
    Default,
    Hash,
    Serialize,
    Deserialize
)]
#[serde(transparent)]
pub struct Id<Marker>(u64, #[serde(skip)] PhantomData<Marker>);

impl<Marker> Id<Marker> {
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id, PhantomData)
    }

    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl<Marker> Display for Id<Marker> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl<Marker> FromStr for Id<Marker> {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        u64::from_str(s).map(Self::new)
    }
}

impl<Marker> From<u64> for Id<Marker> {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

impl<Marker> From<Id<Marker>> for u64 {
    fn from(value: Id<Marker>) -> Self {
        value.get()
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{Id, post::PostMarker};

    #[test]
    fn id_is_transparent_in_json() {
        let id = Id::<PostMarker>::new(1_234_567_890_123);

        assert_eq!(serde_json::to_string(&id).unwrap(), "1234567890123");
        assert_eq!(
            serde_json::from_str::<Id<PostMarker>>("1234567890123").unwrap(),
            id
        );
    }

    #[test]
    fn id_parses_from_path_segment() {
        assert_eq!("42".parse::<Id<PostMarker>>().unwrap(), Id::new(42));
        assert!("-1".parse::<Id<PostMarker>>().is_err());
        assert!("abc".parse::<Id<PostMarker>>().is_err());
    }
}
