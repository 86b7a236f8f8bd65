//! Settings for the client and the reference backend, loaded via OrthoConfig.
//!
//! Both structs read environment variables (and OrthoConfig's usual config
//! files); command-line parsing is left to `clap` in the binaries. Raw values
//! stay optional and accessors apply defaults and validation.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::domain::{
    AccessToken, ActivationCode, ActivationCodeValidationError, Session, UserId,
    UserValidationError,
};

const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8080";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_STATE_DIR_NAME: &str = "activation-client";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Invalid configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `api_base_url` is not an absolute URL.
    #[error("invalid api_base_url {value:?}: {source}")]
    InvalidBaseUrl {
        /// Offending value.
        value: String,
        /// Parse failure.
        #[source]
        source: url::ParseError,
    },
    /// `request_timeout_secs` was zero.
    #[error("request_timeout_secs must be greater than zero")]
    ZeroTimeout,
    /// Only one of `user_id` and `access_token` was set.
    #[error("user_id and access_token must be set together")]
    IncompleteCredentials,
    /// A credential failed validation.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(#[from] UserValidationError),
    /// `bind_addr` is not a socket address.
    #[error("invalid bind_addr {value:?}: {source}")]
    InvalidBindAddr {
        /// Offending value.
        value: String,
        /// Parse failure.
        #[source]
        source: std::net::AddrParseError,
    },
    /// A seeded code failed validation.
    #[error("invalid seed code {value:?}: {source}")]
    InvalidSeedCode {
        /// Offending value.
        value: String,
        /// Validation failure.
        #[source]
        source: ActivationCodeValidationError,
    },
}

/// Client configuration.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ACTIVATION")]
pub struct ClientSettings {
    /// Base URL of the activation backend.
    pub api_base_url: Option<String>,
    /// Transport timeout for each request, in seconds.
    pub request_timeout_secs: Option<u64>,
    /// Signed-in user id; requires `access_token`.
    pub user_id: Option<String>,
    /// Bearer token of the signed-in user; requires `user_id`.
    pub access_token: Option<String>,
    /// Directory holding the code deferred across sign-up.
    pub state_dir: Option<PathBuf>,
}

impl ClientSettings {
    /// Backend base URL, defaulting to the local development server.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] when the value does not parse.
    pub fn api_base_url(&self) -> Result<Url, ConfigError> {
        let raw = self.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL);
        Url::parse(raw).map_err(|source| ConfigError::InvalidBaseUrl {
            value: raw.to_owned(),
            source,
        })
    }

    /// Request timeout, defaulting to ten seconds.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroTimeout`] for a zero timeout.
    pub fn request_timeout(&self) -> Result<Duration, ConfigError> {
        match self
            .request_timeout_secs
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)
        {
            0 => Err(ConfigError::ZeroTimeout),
            secs => Ok(Duration::from_secs(secs)),
        }
    }

    /// Session built from the configured credentials, if any.
    ///
    /// # Errors
    ///
    /// Returns an error when only one credential is set or either is invalid.
    pub fn session(&self) -> Result<Option<Session>, ConfigError> {
        match (self.user_id.as_deref(), self.access_token.as_deref()) {
            (None, None) => Ok(None),
            (Some(user_id), Some(access_token)) => Ok(Some(Session::new(
                UserId::new(user_id)?,
                AccessToken::new(access_token)?,
            ))),
            _ => Err(ConfigError::IncompleteCredentials),
        }
    }

    /// Pending-code directory, defaulting to a folder under the temp dir.
    #[must_use]
    pub fn state_dir(&self) -> PathBuf {
        self.state_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_STATE_DIR_NAME))
    }
}

/// Reference backend configuration.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ACTIVATION_DEV")]
pub struct DevServerSettings {
    /// Listen address.
    pub bind_addr: Option<String>,
    /// Comma-separated codes issued at startup.
    pub codes: Option<String>,
}

impl DevServerSettings {
    /// Listen address, defaulting to `127.0.0.1:8080`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBindAddr`] when the value does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|source| ConfigError::InvalidBindAddr {
            value: raw.to_owned(),
            source,
        })
    }

    /// Codes to issue at startup. Blank entries are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSeedCode`] for an entry that is not a
    /// valid code.
    pub fn codes(&self) -> Result<Vec<ActivationCode>, ConfigError> {
        self.codes
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .filter(|entry| !entry.trim().is_empty())
            .map(|entry| {
                ActivationCode::new(entry).map_err(|source| ConfigError::InvalidSeedCode {
                    value: entry.to_owned(),
                    source,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const CLIENT_VARS: [&str; 5] = [
        "ACTIVATION_API_BASE_URL",
        "ACTIVATION_REQUEST_TIMEOUT_SECS",
        "ACTIVATION_USER_ID",
        "ACTIVATION_ACCESS_TOKEN",
        "ACTIVATION_STATE_DIR",
    ];

    fn load_client() -> ClientSettings {
        ClientSettings::load_from_iter([OsString::from("activation")])
            .expect("config should load")
    }

    fn load_dev_server() -> DevServerSettings {
        DevServerSettings::load_from_iter([OsString::from("activation-devserver")])
            .expect("config should load")
    }

    fn client_env(overrides: &[(&str, &str)]) -> Vec<(&'static str, Option<String>)> {
        CLIENT_VARS
            .into_iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| *key == name)
                    .map(|(_, value)| (*value).to_owned());
                (name, value)
            })
            .collect()
    }

    #[rstest]
    fn client_defaults_are_used_when_missing() {
        let _guard = lock_env(client_env(&[]));

        let settings = load_client();
        assert_eq!(
            settings.api_base_url().expect("default URL").as_str(),
            "http://127.0.0.1:8080/"
        );
        assert_eq!(
            settings.request_timeout().expect("default timeout"),
            Duration::from_secs(10)
        );
        assert!(settings.session().expect("no credentials").is_none());
        assert_eq!(
            settings.state_dir(),
            std::env::temp_dir().join("activation-client")
        );
    }

    #[rstest]
    fn client_environment_overrides_are_respected() {
        let _guard = lock_env(client_env(&[
            ("ACTIVATION_API_BASE_URL", "https://api.example.test/v1"),
            ("ACTIVATION_REQUEST_TIMEOUT_SECS", "3"),
            ("ACTIVATION_USER_ID", "u1"),
            ("ACTIVATION_ACCESS_TOKEN", "secret"),
            ("ACTIVATION_STATE_DIR", "/tmp/activation-state"),
        ]));

        let settings = load_client();
        assert_eq!(
            settings.api_base_url().expect("URL").as_str(),
            "https://api.example.test/v1"
        );
        assert_eq!(
            settings.request_timeout().expect("timeout"),
            Duration::from_secs(3)
        );
        let session = settings
            .session()
            .expect("credentials valid")
            .expect("session configured");
        assert_eq!(session.user_id().as_ref(), "u1");
        assert_eq!(session.access_token().expose(), "secret");
        assert_eq!(settings.state_dir(), PathBuf::from("/tmp/activation-state"));
    }

    #[rstest]
    fn client_rejects_half_configured_credentials() {
        let _guard = lock_env(client_env(&[("ACTIVATION_USER_ID", "u1")]));

        let error = load_client().session().expect_err("must fail");
        assert!(matches!(error, ConfigError::IncompleteCredentials));
    }

    #[rstest]
    #[case(ClientSettings { api_base_url: Some("not a url".to_owned()), ..empty_client() })]
    #[case(ClientSettings { request_timeout_secs: Some(0), ..empty_client() })]
    #[case(ClientSettings {
        user_id: Some("u 1".to_owned()),
        access_token: Some("t".to_owned()),
        ..empty_client()
    })]
    fn client_accessors_reject_invalid_values(#[case] settings: ClientSettings) {
        let failed = settings.api_base_url().is_err()
            || settings.request_timeout().is_err()
            || settings.session().is_err();
        assert!(failed, "expected a validation failure for {settings:?}");
    }

    fn empty_client() -> ClientSettings {
        ClientSettings {
            api_base_url: None,
            request_timeout_secs: None,
            user_id: None,
            access_token: None,
            state_dir: None,
        }
    }

    #[rstest]
    fn dev_server_reads_bind_addr_and_seed_codes() {
        let _guard = lock_env([
            ("ACTIVATION_DEV_BIND_ADDR", Some("0.0.0.0:9090".to_owned())),
            ("ACTIVATION_DEV_CODES", Some("ABC123, XYZ999,,".to_owned())),
        ]);

        let settings = load_dev_server();
        assert_eq!(
            settings.bind_addr().expect("address"),
            "0.0.0.0:9090".parse::<SocketAddr>().expect("socket address")
        );
        let codes = settings.codes().expect("codes");
        let raw: Vec<&str> = codes.iter().map(AsRef::as_ref).collect();
        assert_eq!(raw, ["ABC123", "XYZ999"]);
    }

    #[rstest]
    fn dev_server_defaults_when_missing() {
        let _guard = lock_env([
            ("ACTIVATION_DEV_BIND_ADDR", None::<String>),
            ("ACTIVATION_DEV_CODES", None::<String>),
        ]);

        let settings = load_dev_server();
        assert_eq!(
            settings.bind_addr().expect("address").to_string(),
            "127.0.0.1:8080"
        );
        assert!(settings.codes().expect("codes").is_empty());
    }

    #[rstest]
    fn dev_server_rejects_malformed_values() {
        let settings = DevServerSettings {
            bind_addr: Some("localhost".to_owned()),
            codes: Some("OK1,BAD/2".to_owned()),
        };
        assert!(matches!(
            settings.bind_addr(),
            Err(ConfigError::InvalidBindAddr { .. })
        ));
        assert!(matches!(
            settings.codes(),
            Err(ConfigError::InvalidSeedCode { .. })
        ));
    }
}
