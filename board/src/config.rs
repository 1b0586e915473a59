//! Board configuration
//!
//! Defaults mirror the production JSON store; every value can be overridden
//! from the environment (optionally through a `.env` file) or the CLI.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use shared::ProjectId;
use crate::error::{BoardError, BoardResult};

pub const DEFAULT_STORE_URL: &str = "https://www.momenteeria.it/jsonbin/index.php";
pub const DEFAULT_METADATA_URL: &str = "https://www.momenteeria.it/jsonbin/update.php";
pub const DEFAULT_READ_PROXY: &str = "https://api.allorigins.win/get?url=";

/// Additional attempts after the first failed request
pub const MAX_RETRIES: u32 = 2;
pub const RETRY_DELAY: Duration = Duration::from_millis(1000);
pub const DEBOUNCE: Duration = Duration::from_millis(2000);

/// Linear backoff: attempt N (1-based) waits N × base delay before retrying
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self { max_retries, base_delay }
    }

    /// Total number of attempts including the first one
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay to wait after the given failed attempt (1-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(MAX_RETRIES, RETRY_DELAY)
    }
}

/// Complete board configuration
#[derive(Debug, Clone)]
pub struct BoardConfig {
    pub store_url: String,
    pub metadata_url: String,
    /// Read-only CORS proxy prefix for loads; `None` fetches directly
    pub read_proxy: Option<String>,
    pub retry: RetryPolicy,
    pub debounce: Duration,
    pub project: Option<ProjectId>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            store_url: DEFAULT_STORE_URL.to_string(),
            metadata_url: DEFAULT_METADATA_URL.to_string(),
            read_proxy: Some(DEFAULT_READ_PROXY.to_string()),
            retry: RetryPolicy::default(),
            debounce: DEBOUNCE,
            project: None,
        }
    }
}

impl BoardConfig {
    /// Load configuration from `BOARD_*` environment variables
    pub fn from_env() -> BoardResult<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> BoardResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("BOARD_STORE_URL") {
            config.store_url = url;
        }
        if let Some(url) = lookup("BOARD_METADATA_URL") {
            config.metadata_url = url;
        }
        if let Some(proxy) = lookup("BOARD_READ_PROXY") {
            config.read_proxy = if proxy.trim().is_empty() { None } else { Some(proxy) };
        }
        if let Some(value) = lookup("BOARD_MAX_RETRIES") {
            config.retry.max_retries = parse_number("BOARD_MAX_RETRIES", &value)?;
        }
        if let Some(value) = lookup("BOARD_RETRY_DELAY_MS") {
            config.retry.base_delay = Duration::from_millis(parse_number("BOARD_RETRY_DELAY_MS", &value)?);
        }
        if let Some(value) = lookup("BOARD_DEBOUNCE_MS") {
            config.debounce = Duration::from_millis(parse_number("BOARD_DEBOUNCE_MS", &value)?);
        }
        config.project = ProjectId::from_optional(lookup("BOARD_PROJECT_ID").as_deref());

        Ok(config)
    }
}

fn parse_number<T: FromStr>(field: &str, value: &str) -> BoardResult<T> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| BoardError::config(format!("{field} must be a non-negative integer, got {value:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = BoardConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.store_url, DEFAULT_STORE_URL);
        assert_eq!(config.retry.max_attempts(), 3);
        assert_eq!(config.debounce, Duration::from_millis(2000));
        assert!(config.project.is_none());
        assert!(config.read_proxy.is_some());
    }

    #[test]
    fn test_overrides() {
        let config = BoardConfig::from_lookup(lookup_from(&[
            ("BOARD_STORE_URL", "http://localhost:9000/store"),
            ("BOARD_READ_PROXY", ""),
            ("BOARD_MAX_RETRIES", "4"),
            ("BOARD_RETRY_DELAY_MS", "10"),
            ("BOARD_DEBOUNCE_MS", "50"),
            ("BOARD_PROJECT_ID", "acme"),
        ]))
        .unwrap();

        assert_eq!(config.store_url, "http://localhost:9000/store");
        assert!(config.read_proxy.is_none());
        assert_eq!(config.retry, RetryPolicy::new(4, Duration::from_millis(10)));
        assert_eq!(config.debounce, Duration::from_millis(50));
        assert_eq!(config.project.unwrap().as_str(), "acme");
    }

    #[test]
    fn test_invalid_number_is_config_error() {
        let result = BoardConfig::from_lookup(lookup_from(&[("BOARD_DEBOUNCE_MS", "soon")]));
        assert!(matches!(result, Err(BoardError::Config { .. })));
    }

    #[test]
    fn test_retry_count_out_of_range_is_config_error() {
        let result = BoardConfig::from_lookup(lookup_from(&[("BOARD_MAX_RETRIES", "4294967296")]));
        assert!(matches!(result, Err(BoardError::Config { .. })));

        let config = BoardConfig::from_lookup(lookup_from(&[("BOARD_MAX_RETRIES", "4294967295")])).unwrap();
        assert_eq!(config.retry.max_attempts(), u32::MAX);
    }

    #[test]
    fn test_linear_backoff() {
        let policy = RetryPolicy::new(2, Duration::from_millis(1000));
        assert_eq!(policy.delay_after(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_after(2), Duration::from_millis(2000));
    }
}
