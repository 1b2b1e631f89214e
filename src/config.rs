//! Client configuration parsed from environment variables.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://trueline.onrender.com/api";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("{var} must be a whole number of seconds, got `{value}`")]
    InvalidSeconds { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Origin plus path prefix; every endpoint is joined under it.
    pub api_url: String,
    /// Directory holding the durable `authToken`/`authUser` entries.
    pub state_dir: PathBuf,
    /// Overall per-request timeout. `None` leaves it to the transport,
    /// which never times out a request on its own.
    pub request_timeout: Option<Duration>,
    pub connect_timeout: Duration,
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `TRUELINE_API_URL`: default `https://trueline.onrender.com/api`
    /// - `TRUELINE_STATE_DIR`: default `<local data dir>/trueline`
    /// - `TRUELINE_REQUEST_TIMEOUT_SECS`: unset means no overall timeout
    /// - `TRUELINE_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] but reads variables through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = parse_api_url(lookup("TRUELINE_API_URL").as_deref())?;
        let state_dir = lookup("TRUELINE_STATE_DIR")
            .filter(|v| !v.trim().is_empty())
            .map_or_else(default_state_dir, PathBuf::from);
        let request_timeout =
            parse_secs("TRUELINE_REQUEST_TIMEOUT_SECS", lookup("TRUELINE_REQUEST_TIMEOUT_SECS").as_deref())?
                .map(Duration::from_secs);
        let connect_timeout = Duration::from_secs(
            parse_secs("TRUELINE_CONNECT_TIMEOUT_SECS", lookup("TRUELINE_CONNECT_TIMEOUT_SECS").as_deref())?
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
        );

        Ok(Self { api_url, state_dir, request_timeout, connect_timeout })
    }

    /// Config pointing at `api_url` with default timeouts, for tests and embedding.
    #[must_use]
    pub fn with_api_url(api_url: &str, state_dir: PathBuf) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_owned(),
            state_dir,
            request_timeout: None,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

pub(crate) fn parse_api_url(raw: Option<&str>) -> Result<String, ConfigError> {
    let url = raw.map_or(DEFAULT_API_URL, str::trim).trim_end_matches('/');
    let host = url.strip_prefix("https://").or_else(|| url.strip_prefix("http://"));
    match host {
        Some(rest) if !rest.is_empty() && !rest.starts_with('/') => Ok(url.to_owned()),
        _ => Err(ConfigError::InvalidBaseUrl(url.to_owned())),
    }
}

fn parse_secs(var: &'static str, raw: Option<&str>) -> Result<Option<u64>, ConfigError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidSeconds { var, value: value.to_owned() }),
    }
}

fn default_state_dir() -> PathBuf {
    dirs::data_local_dir().map_or_else(|| PathBuf::from(".trueline"), |dir| dir.join("trueline"))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
