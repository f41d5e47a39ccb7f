//! Client configuration: base URL, request timeout and user agent.
//!
//! # Design
//! `ClientConfig` is a plain value. `from_env` reads the `CHERRYPICKER_*`
//! variables through `from_lookup`, which takes the lookup as a function so
//! tests never touch the process environment. Anything unset keeps its
//! default; anything set but malformed is a `ConfigError`.

use std::env;
use std::num::ParseIntError;
use std::time::Duration;

use thiserror::Error;
use tracing::info;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://api.cherrypicker.kr";
pub const DEFAULT_USER_AGENT: &str = concat!("cherrypicker-core/", env!("CARGO_PKG_VERSION"));

pub const BASE_URL_VAR: &str = "CHERRYPICKER_BASE_URL";
pub const TIMEOUT_VAR: &str = "CHERRYPICKER_TIMEOUT_SECS";
pub const USER_AGENT_VAR: &str = "CHERRYPICKER_USER_AGENT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid base url {value:?}: {source}")]
    InvalidBaseUrl {
        value: String,
        source: url::ParseError,
    },

    #[error("base url {0:?} must use http or https")]
    UnsupportedScheme(String),

    #[error("invalid timeout {value:?}: {source}")]
    InvalidTimeout {
        value: String,
        source: ParseIntError,
    },
}

/// Where and how the client talks to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: Url,
    /// Whole-request timeout. `None` leaves the transport default in place.
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base url is valid"),
            timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            ..Self::default()
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Read overrides from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from `lookup`, falling back to defaults for unset keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        match lookup(BASE_URL_VAR) {
            Some(value) => config.base_url = parse_base_url(&value)?,
            None => info!("{BASE_URL_VAR} not set, using default: {DEFAULT_BASE_URL}"),
        }

        if let Some(value) = lookup(TIMEOUT_VAR) {
            let secs: u64 = value
                .trim()
                .parse()
                .map_err(|source| ConfigError::InvalidTimeout {
                    value: value.clone(),
                    source,
                })?;
            config.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        if let Some(value) = lookup(USER_AGENT_VAR) {
            config.user_agent = value;
        }

        Ok(config)
    }
}

fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim()).map_err(|source| ConfigError::InvalidBaseUrl {
        value: value.to_string(),
        source,
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::UnsupportedScheme(value.to_string()));
    }
    Ok(url)
}
