//! Client configuration loaded via OrthoConfig.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

const DEFAULT_BASE_URL: &str = "http://localhost:5000/";

/// Errors raised while interpreting [`ClientSettings`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    /// The configured base URL does not parse.
    #[error("invalid item service base url {value:?}: {message}")]
    InvalidBaseUrl {
        /// Value as configured.
        value: String,
        /// Parser diagnostic.
        message: String,
    },
    /// The configured timeout is zero.
    #[error("item service timeout must be at least 1 ms")]
    ZeroTimeout,
}

/// Settings controlling how the client reaches the item service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ITEM_CLIENT")]
pub struct ClientSettings {
    /// Base URL of the item service; routes resolve below it.
    pub base_url: Option<String>,
    /// Request timeout in milliseconds.
    #[ortho_config(default = 10_000)]
    pub timeout_ms: u64,
}

impl ClientSettings {
    /// Return the configured base URL, falling back to the default.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidBaseUrl`] when the value does not
    /// parse as an absolute URL.
    pub fn base_url(&self) -> Result<Url, SettingsError> {
        let value = self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        Url::parse(value).map_err(|error| SettingsError::InvalidBaseUrl {
            value: value.to_owned(),
            message: error.to_string(),
        })
    }

    /// Return the configured request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::ZeroTimeout`] for a zero timeout.
    pub fn timeout(&self) -> Result<Duration, SettingsError> {
        match self.timeout_ms {
            0 => Err(SettingsError::ZeroTimeout),
            millis => Ok(Duration::from_millis(millis)),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for client configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const DEFAULT_TIMEOUT_MS: u64 = 10_000;

    fn load_from_empty_args() -> ClientSettings {
        ClientSettings::load_from_iter([OsString::from("item-client")])
            .expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env([
            ("ITEM_CLIENT_BASE_URL", None::<String>),
            ("ITEM_CLIENT_TIMEOUT_MS", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.base_url().expect("default url parses").as_str(),
            DEFAULT_BASE_URL
        );
        assert_eq!(
            settings.timeout().expect("default timeout is positive"),
            Duration::from_millis(DEFAULT_TIMEOUT_MS)
        );
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            (
                "ITEM_CLIENT_BASE_URL",
                Some("https://catalogue.example.test/api/".to_owned()),
            ),
            ("ITEM_CLIENT_TIMEOUT_MS", Some("2500".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.base_url().expect("url parses").as_str(),
            "https://catalogue.example.test/api/"
        );
        assert_eq!(
            settings.timeout().expect("timeout is positive"),
            Duration::from_millis(2500)
        );
    }

    #[rstest]
    fn invalid_values_are_reported() {
        let settings = ClientSettings {
            base_url: Some("not a url".to_owned()),
            timeout_ms: 0,
        };

        assert!(matches!(
            settings.base_url(),
            Err(SettingsError::InvalidBaseUrl { value, .. }) if value == "not a url"
        ));
        assert_eq!(settings.timeout(), Err(SettingsError::ZeroTimeout));
    }
}
