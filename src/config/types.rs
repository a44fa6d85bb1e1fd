//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use crate::service::ServerConfig;
use crate::todoist::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};

/// Default location of the section memory database.
pub const DEFAULT_DB_PATH: &str = "data/Todoist.db";

/// Settings for a sorter process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SorterConfig {
    /// Project whose tasks are sorted.
    pub project_id: String,
    /// Todoist API bearer token.
    pub api_token: String,
    /// Pause between reconciliation passes; `None` disables the loop.
    pub reconcile_interval: Option<Duration>,
    /// `SQLite` file holding section memory.
    pub db_path: PathBuf,
    /// Todoist API base URL.
    pub api_url: String,
    /// Per-request timeout for Todoist calls.
    pub api_timeout: Duration,
    /// Webhook server bind settings.
    pub server: ServerConfig,
}

impl SorterConfig {
    /// Config with defaults for everything but the required values.
    #[must_use]
    pub fn new(project_id: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            api_token: api_token.into(),
            reconcile_interval: None,
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            api_url: DEFAULT_BASE_URL.to_string(),
            api_timeout: DEFAULT_TIMEOUT,
            server: ServerConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_applies_defaults() {
        let config = SorterConfig::new("2203306141", "secret");
        assert_eq!(config.project_id, "2203306141");
        assert_eq!(config.api_token, "secret");
        assert_eq!(config.reconcile_interval, None);
        assert_eq!(config.db_path, PathBuf::from("data/Todoist.db"));
        assert_eq!(config.api_url, "https://api.todoist.com/api/v1");
        assert_eq!(config.api_timeout, Duration::from_secs(10));
        assert_eq!(config.server.port, 5005);
    }
}
