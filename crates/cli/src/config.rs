//! Environment configuration, read once at startup.
//!
//! | Variable | Required | Meaning |
//! |----------|----------|---------|
//! | `GITHUB_URL` | yes | Base URL of the GitHub REST API (e.g. `https://api.github.com/`) |
//! | `GITHUB_TIMEOUT_SECS` | no | Per-request timeout for compare calls; unbounded when unset |
//! | `OTEL_EXPORTER_OTLP_ENDPOINT` | no | Enables OTLP span export to this endpoint |
//! | `RUST_LOG` | no | `tracing` filter, read by the observability layer (default `info`) |
//!
//! Empty values are treated as unset.

use std::time::Duration;

use github::Url;
use thiserror::Error;

pub const GITHUB_URL_VAR: &str = "GITHUB_URL";
pub const GITHUB_TIMEOUT_VAR: &str = "GITHUB_TIMEOUT_SECS";
pub const OTLP_ENDPOINT_VAR: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";

/// Startup configuration problems. All of them stop the process.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("{0} must be set")]
    Missing(&'static str),

    /// The value does not parse as an absolute `http` or `https` URL.
    #[error("{var} is not a valid http(s) URL ({value:?}): {reason}")]
    InvalidUrl {
        /// Variable that held the value.
        var: &'static str,
        /// The rejected value.
        value: String,
        /// Parser or scheme complaint.
        reason: String,
    },

    /// The value is not a whole number of seconds above zero.
    #[error("{var} must be a positive whole number of seconds, got {value:?}")]
    InvalidTimeout {
        /// Variable that held the value.
        var: &'static str,
        /// The rejected value.
        value: String,
    },
}

/// Validated process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Root of the GitHub REST API that compare calls go to.
    pub github_url: Url,
    /// Whole-request timeout for compare calls; `None` leaves them unbounded.
    pub github_timeout: Option<Duration>,
    /// OTLP collector endpoint; span export is off when `None`.
    pub otlp_endpoint: Option<String>,
}

impl Config {
    /// Loads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Loads the configuration through `lookup`, which maps a variable name
    /// to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());

        let raw_url = get(GITHUB_URL_VAR).ok_or(ConfigError::Missing(GITHUB_URL_VAR))?;
        let github_url = parse_base_url(GITHUB_URL_VAR, raw_url.trim())?;

        let github_timeout = get(GITHUB_TIMEOUT_VAR)
            .map(|value| parse_timeout(GITHUB_TIMEOUT_VAR, &value))
            .transpose()?;

        Ok(Self {
            github_url,
            github_timeout,
            otlp_endpoint: get(OTLP_ENDPOINT_VAR),
        })
    }
}

fn parse_base_url(var: &'static str, value: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        var,
        value: value.to_string(),
        reason,
    };

    let url = Url::parse(value).map_err(|err| invalid(err.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme {other:?}"))),
    }
}

fn parse_timeout(var: &'static str, value: &str) -> Result<Duration, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout {
            var,
            value: value.to_string(),
        }),
    }
}
