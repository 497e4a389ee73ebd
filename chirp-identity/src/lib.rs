//! Client for the identity provider's user directory.

pub mod client;
pub mod record;
