//! Environment configuration loader.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use super::types::SorterConfig;

pub const ENV_PROJECT: &str = "PROJECT";
pub const ENV_API_TOKEN: &str = "APITOKEN";
pub const ENV_RECONCILE_INTERVAL: &str = "RECONCILE_INTERVAL";
pub const ENV_DB_PATH: &str = "DB_PATH";
pub const ENV_HOST: &str = "HOST";
pub const ENV_PORT: &str = "PORT";
pub const ENV_API_URL: &str = "TODOIST_API_URL";
pub const ENV_API_TIMEOUT: &str = "API_TIMEOUT";
/// Read by the tracing setup rather than the loader.
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";

/// Errors that can occur during configuration loading.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Required environment variable {0} is not set")]
    Missing(&'static str),

    #[error("Invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

impl SorterConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`; empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value is malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let project_id = get(ENV_PROJECT).ok_or(ConfigError::Missing(ENV_PROJECT))?;
        let api_token = get(ENV_API_TOKEN).ok_or(ConfigError::Missing(ENV_API_TOKEN))?;
        let mut config = Self::new(project_id, api_token);

        if let Some(value) = get(ENV_RECONCILE_INTERVAL) {
            config.reconcile_interval = Some(parse_seconds(ENV_RECONCILE_INTERVAL, &value)?);
        }
        if let Some(value) = get(ENV_API_TIMEOUT) {
            config.api_timeout = parse_seconds(ENV_API_TIMEOUT, &value)?;
        }
        if let Some(value) = get(ENV_DB_PATH) {
            config.db_path = PathBuf::from(value);
        }
        if let Some(value) = get(ENV_API_URL) {
            config.api_url = value;
        }
        if let Some(value) = get(ENV_HOST) {
            config.server.host = value;
        }
        if let Some(value) = get(ENV_PORT) {
            config.server.port = parse(ENV_PORT, &value)?;
        }

        Ok(config)
    }
}

fn parse<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn parse_seconds(var: &'static str, value: &str) -> Result<Duration, ConfigError> {
    let secs: u64 = parse(var, value)?;
    if secs == 0 {
        return Err(ConfigError::Invalid {
            var,
            value: value.to_string(),
            reason: "must be at least 1 second".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}
