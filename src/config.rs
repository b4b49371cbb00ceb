// Console configuration
// Base URL, starting token and optional transport timeout

use std::time::Duration;

use crate::auth::DEFAULT_TOKEN;

/// Unversioned root: the backend serves both `/health` and `/api/v1/...`.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub base_url: String,
    pub token: String,
    pub timeout: Option<Duration>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: DEFAULT_TOKEN.to_string(),
            timeout: None,
        }
    }
}

impl ConsoleConfig {
    pub fn new(base_url: Option<&str>, token: Option<&str>, timeout_secs: Option<u64>) -> Self {
        let defaults = Self::default();
        Self {
            base_url: base_url
                .map(|b| b.trim().to_string())
                .filter(|b| !b.is_empty())
                .unwrap_or(defaults.base_url),
            token: token.map(|t| t.trim().to_string()).unwrap_or(defaults.token),
            timeout: timeout_secs.filter(|s| *s > 0).map(Duration::from_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_for_missing_values() {
        let config = ConsoleConfig::new(None, None, None);
        assert_eq!(config, ConsoleConfig::default());
    }

    #[test]
    fn explicit_values_win() {
        let config = ConsoleConfig::new(Some("http://api:9000 "), Some(""), Some(5));
        assert_eq!(config.base_url, "http://api:9000");
        assert_eq!(config.token, "");
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
        assert_eq!(ConsoleConfig::new(None, None, Some(0)).timeout, None);
    }
}
