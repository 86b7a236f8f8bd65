//! Caller identity: user identifiers, bearer tokens, and sessions.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Maximum accepted length for a user identifier.
pub const USER_ID_MAX: usize = 128;

/// Validation errors returned by [`UserId::new`] and [`AccessToken::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// The identifier was empty.
    #[error("user id must not be empty")]
    EmptyId,
    /// The identifier contained whitespace or control characters.
    #[error("user id must not contain whitespace or control characters")]
    InvalidId,
    /// The identifier exceeded [`USER_ID_MAX`] characters.
    #[error("user id must be at most {max} characters")]
    IdTooLong {
        /// Maximum permitted length.
        max: usize,
    },
    /// The access token was empty.
    #[error("access token must not be empty")]
    EmptyToken,
}

/// Opaque identifier of a user account, as issued by the auth provider.
///
/// The backend treats ids as opaque strings (`u1`, a UUID, a provider uid);
/// the only constraints are non-emptiness and the absence of whitespace.
///
/// # Examples
/// ```
/// use activation::domain::UserId;
///
/// let id = UserId::new("u1").expect("valid id");
/// assert_eq!(id.as_ref(), "u1");
/// assert!(UserId::new(" ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    fn from_owned(id: String) -> Result<Self, UserValidationError> {
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(UserValidationError::InvalidId);
        }
        if id.chars().count() > USER_ID_MAX {
            return Err(UserValidationError::IdTooLong { max: USER_ID_MAX });
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Bearer credential for the authenticated session.
///
/// The secret is zeroised on drop and never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(Zeroizing<String>);

impl AccessToken {
    /// Wrap a bearer token, rejecting blank values.
    pub fn new(token: impl Into<String>) -> Result<Self, UserValidationError> {
        let token = Zeroizing::new(token.into());
        if token.trim().is_empty() {
            return Err(UserValidationError::EmptyToken);
        }
        Ok(Self(token))
    }

    /// Expose the raw token for transport headers.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Authenticated caller: the user and the credential used for claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user_id: UserId,
    access_token: AccessToken,
}

impl Session {
    /// Build a session from an already validated identity and token.
    #[must_use]
    pub fn new(user_id: UserId, access_token: AccessToken) -> Self {
        Self {
            user_id,
            access_token,
        }
    }

    /// The signed-in user.
    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Bearer token sent with authenticated requests.
    #[must_use]
    pub fn access_token(&self) -> &AccessToken {
        &self.access_token
    }
}
