//! Driving port for bearer-token authentication on the reference backend.
//!
//! Inbound handlers call it to resolve the caller without knowing the
//! identity provider, so handler tests can substitute a double.

use async_trait::async_trait;

use crate::domain::{Error, UserId};

/// Resolve a bearer token to the authenticated user.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Validate `token` and return the user it belongs to.
    async fn authenticate(&self, token: &str) -> Result<UserId, Error>;
}

/// Development authenticator: the bearer token *is* the user id.
///
/// This keeps the reference backend usable without an identity provider.
/// Never expose it outside local development.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAuthenticator;

#[async_trait]
impl Authenticator for FixtureAuthenticator {
    async fn authenticate(&self, token: &str) -> Result<UserId, Error> {
        UserId::new(token).map_err(|_| Error::unauthorized("Invalid access token"))
    }
}
