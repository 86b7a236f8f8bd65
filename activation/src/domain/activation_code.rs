//! Activation-code value types.
//!
//! Two views of a code exist: [`CodeStatus`] is what the client reads back
//! from the status-check endpoint, while [`ActivationCodeRecord`] is the
//! backend's authoritative record. The record encodes "owner present iff
//! claimed" in its type; the client view cannot, because the wire contract
//! allows a claimed code without an owner.

use std::fmt;

use chrono::{DateTime, Utc};
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use url::Url;

use super::UserId;

/// Maximum accepted length of an activation code.
pub const ACTIVATION_CODE_MAX: usize = 128;

const LINK_QUERY_KEY: &str = "code";
const LINK_PATH_MARKER: &str = "activate";

/// Validation errors returned by [`ActivationCode::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActivationCodeValidationError {
    /// The code was empty once trimmed.
    #[error("activation code must not be empty")]
    Empty,
    /// The code exceeded [`ACTIVATION_CODE_MAX`] characters.
    #[error("activation code must be at most {max} characters")]
    TooLong {
        /// Maximum permitted length.
        max: usize,
    },
    /// The code contained control characters or a path separator.
    #[error("activation code must not contain control characters or '/'")]
    InvalidCharacters,
    /// A link did not carry a code.
    #[error("link does not contain an activation code")]
    MissingFromLink,
}

/// Opaque, human-shareable activation code.
///
/// Surrounding whitespace is trimmed (codes are often pasted or scanned);
/// the inner value is kept verbatim and compared exactly.
///
/// # Examples
/// ```
/// use activation::domain::ActivationCode;
///
/// let code = ActivationCode::new(" ABC123 ").expect("valid code");
/// assert_eq!(code.as_ref(), "ABC123");
/// assert!(ActivationCode::new("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ActivationCode(String);

impl ActivationCode {
    /// Validate and construct an [`ActivationCode`].
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ActivationCodeValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ActivationCodeValidationError::Empty);
        }
        if trimmed.chars().count() > ACTIVATION_CODE_MAX {
            return Err(ActivationCodeValidationError::TooLong {
                max: ACTIVATION_CODE_MAX,
            });
        }
        if trimmed.chars().any(|c| c.is_control() || c == '/') {
            return Err(ActivationCodeValidationError::InvalidCharacters);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Extract a code from a share link or deep link.
    ///
    /// The `code` query parameter wins; otherwise the path segment following
    /// `activate` is used, so both `https://host/activate?code=X` and
    /// `app://activate/X` resolve to `X`.
    ///
    /// # Examples
    /// ```
    /// use activation::domain::ActivationCode;
    /// use url::Url;
    ///
    /// let link = Url::parse("https://example.test/activate?code=ABC123").expect("url");
    /// let code = ActivationCode::from_link(&link).expect("code in link");
    /// assert_eq!(code.as_ref(), "ABC123");
    /// ```
    pub fn from_link(link: &Url) -> Result<Self, ActivationCodeValidationError> {
        if let Some((_, value)) = link.query_pairs().find(|(key, _)| key == LINK_QUERY_KEY) {
            return Self::new(value);
        }

        // `app://activate/X` parses `activate` as the host.
        let mut segments: Vec<&str> = link.host_str().into_iter().collect();
        segments.extend(link.path_segments().into_iter().flatten());
        segments
            .iter()
            .position(|segment| *segment == LINK_PATH_MARKER)
            .and_then(|index| segments.get(index + 1))
            .filter(|segment| !segment.is_empty())
            .ok_or(ActivationCodeValidationError::MissingFromLink)
            .and_then(|segment| decode_segment(segment))
            .and_then(Self::new)
    }

    /// Parse either a raw code or a link containing one.
    pub fn parse_input(input: &str) -> Result<Self, ActivationCodeValidationError> {
        match Url::parse(input.trim()) {
            Ok(link) if link.has_host() || link.query().is_some() => Self::from_link(&link),
            _ => Self::new(input),
        }
    }
}

// Path segments stay percent-encoded in `Url`; query values are already
// decoded, so both positions yield the same code.
fn decode_segment(segment: &str) -> Result<String, ActivationCodeValidationError> {
    percent_decode_str(segment)
        .decode_utf8()
        .map(String::from)
        .map_err(|_| ActivationCodeValidationError::InvalidCharacters)
}

impl AsRef<str> for ActivationCode {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ActivationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<ActivationCode> for String {
    fn from(value: ActivationCode) -> Self {
        value.0
    }
}

impl TryFrom<String> for ActivationCode {
    type Error = ActivationCodeValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Status reported by the status-check endpoint.
///
/// Unknown wire values are kept verbatim so callers can log them; the flow
/// classifies them as invalid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActivationStatus {
    /// Unclaimed and redeemable.
    Active,
    /// Bound to an owner.
    Claimed,
    /// Any other status, including the backend's `invalid`.
    Unrecognised(String),
}

impl ActivationStatus {
    /// Wire representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "active",
            Self::Claimed => "claimed",
            Self::Unrecognised(raw) => raw.as_str(),
        }
    }
}

impl From<String> for ActivationStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "active" => Self::Active,
            "claimed" => Self::Claimed,
            _ => Self::Unrecognised(value),
        }
    }
}

impl From<ActivationStatus> for String {
    fn from(value: ActivationStatus) -> Self {
        match value {
            ActivationStatus::Unrecognised(raw) => raw,
            other => other.as_str().to_owned(),
        }
    }
}

impl fmt::Display for ActivationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client view of a code as returned by `GET /activation/check/{code}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeStatus {
    /// Reported lifecycle status.
    pub status: ActivationStatus,
    /// Owner of a claimed code, when the backend recorded one.
    pub owner_id: Option<UserId>,
}

impl CodeStatus {
    /// Status of an unclaimed code.
    #[must_use]
    pub const fn active() -> Self {
        Self {
            status: ActivationStatus::Active,
            owner_id: None,
        }
    }

    /// Status of a code claimed by `owner`.
    #[must_use]
    pub const fn claimed_by(owner: UserId) -> Self {
        Self {
            status: ActivationStatus::Claimed,
            owner_id: Some(owner),
        }
    }
}

/// Successful response body of `POST /activation/claim`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimReceipt {
    /// Whether the backend performed the claim.
    pub success: bool,
    /// Server-supplied message for the user.
    pub message: String,
}

/// Backend-side lifecycle state of a code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeState {
    /// Issued and not yet claimed.
    Active,
    /// Claimed exactly once.
    Claimed {
        /// The claiming user.
        owner: UserId,
        /// When the claim was recorded.
        claimed_at: DateTime<Utc>,
    },
}

/// Authoritative record held by the backend registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationCodeRecord {
    /// The code itself.
    pub code: ActivationCode,
    /// Current lifecycle state.
    pub state: CodeState,
}

impl ActivationCodeRecord {
    /// Create a freshly issued, unclaimed record.
    #[must_use]
    pub const fn issued(code: ActivationCode) -> Self {
        Self {
            code,
            state: CodeState::Active,
        }
    }

    /// Owner of the code, if claimed.
    #[must_use]
    pub fn owner(&self) -> Option<&UserId> {
        match &self.state {
            CodeState::Active => None,
            CodeState::Claimed { owner, .. } => Some(owner),
        }
    }

    /// Project the record onto the client-visible status.
    #[must_use]
    pub fn to_status(&self) -> CodeStatus {
        match &self.state {
            CodeState::Active => CodeStatus::active(),
            CodeState::Claimed { owner, .. } => CodeStatus::claimed_by(owner.clone()),
        }
    }
}
