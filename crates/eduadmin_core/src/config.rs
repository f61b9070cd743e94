//! Configuration loading from environment variables.

use crate::constants::{
    DEFAULT_API_URL, DEFAULT_OPTION_LIMIT, DEFAULT_PAGE_SIZE, DEFAULT_REQUEST_TIMEOUT_SECS,
};
use serde::Deserialize;
use std::env;
use std::str::FromStr;

/// Runtime configuration shared by the GUI and CLI.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Base URL of the content API (no trailing slash required).
    pub api_url: String,
    /// Page size for incremental (modal) selectors.
    pub page_size: usize,
    /// Bounded fetch size for dropdown option caches.
    pub option_limit: usize,
    pub request_timeout_secs: u64,
    /// Serve selectors from built-in sample data instead of the API.
    pub offline: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            option_limit: DEFAULT_OPTION_LIMIT,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            offline: false,
        }
    }
}

/// Parse a boolean-like environment flag value.
///
/// # Supported Values
/// - Truthy: `1`, `true`, `yes`, `on`
/// - Falsy: `0`, `false`, `no`, `off`, empty string
///
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Returns
/// `Some(bool)` when the value is recognized, otherwise `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean flag from the environment.
///
/// Missing or unrecognized values are treated as `false`.
pub fn env_flag_enabled(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_env_flag(&value))
        .unwrap_or(false)
}

/// Read a positive number from the environment, falling back on missing,
/// unparsable or zero values.
fn env_positive<T>(name: &str, fallback: T) -> T
where
    T: FromStr + PartialEq + Default,
{
    env::var(name)
        .ok()
        .and_then(|raw| raw.trim().parse::<T>().ok())
        .filter(|value| *value != T::default())
        .unwrap_or(fallback)
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `EDUADMIN_API_URL` | `http://localhost:1337` |
    /// | `EDUADMIN_PAGE_SIZE` | `20` |
    /// | `EDUADMIN_OPTION_LIMIT` | `100` |
    /// | `EDUADMIN_REQUEST_TIMEOUT_SECS` | `30` |
    /// | `EDUADMIN_OFFLINE` | off |
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_url: env::var("EDUADMIN_API_URL")
                .ok()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or(defaults.api_url),
            page_size: env_positive("EDUADMIN_PAGE_SIZE", defaults.page_size),
            option_limit: env_positive("EDUADMIN_OPTION_LIMIT", defaults.option_limit),
            request_timeout_secs: env_positive(
                "EDUADMIN_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            ),
            offline: env_flag_enabled("EDUADMIN_OFFLINE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_env_flag, Config};
    use crate::env::{env_lock, ScopedEnv};

    #[test]
    fn parse_env_flag_accepts_truthy_values() {
        for value in ["1", "true", "TRUE", " yes ", "on"] {
            assert_eq!(parse_env_flag(value), Some(true), "value: {}", value);
        }
    }

    #[test]
    fn parse_env_flag_accepts_falsy_values() {
        for value in ["", "0", "false", "FALSE", " no ", "off"] {
            assert_eq!(parse_env_flag(value), Some(false), "value: {}", value);
        }
    }

    #[test]
    fn parse_env_flag_rejects_unknown_values() {
        assert_eq!(parse_env_flag("maybe"), None);
        assert_eq!(parse_env_flag("enabled"), None);
    }

    #[test]
    fn from_env_uses_defaults_when_unset() {
        let _lock = env_lock().lock().expect("env lock");
        let _env = ScopedEnv::new()
            .remove("EDUADMIN_API_URL")
            .remove("EDUADMIN_PAGE_SIZE")
            .remove("EDUADMIN_OPTION_LIMIT")
            .remove("EDUADMIN_REQUEST_TIMEOUT_SECS")
            .remove("EDUADMIN_OFFLINE");
        assert_eq!(Config::from_env(), Config::default());
    }

    #[test]
    fn from_env_reads_overrides_and_ignores_zero_sizes() {
        let _lock = env_lock().lock().expect("env lock");
        let _env = ScopedEnv::new()
            .set("EDUADMIN_API_URL", " http://cms.internal:8080 ")
            .set("EDUADMIN_PAGE_SIZE", "0")
            .set("EDUADMIN_OPTION_LIMIT", "250")
            .set("EDUADMIN_REQUEST_TIMEOUT_SECS", "not-a-number")
            .set("EDUADMIN_OFFLINE", "yes");
        let config = Config::from_env();
        assert_eq!(config.api_url, "http://cms.internal:8080");
        assert_eq!(config.page_size, 20);
        assert_eq!(config.option_limit, 250);
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.offline);
    }
}
