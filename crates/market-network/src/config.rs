//! # Market Configuration
//!
//! Protocol limits and local paths, loadable from TOML.

use crate::domain::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Market protocol configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    /// Longest direct message body, in bytes. Longer messages are dropped.
    pub max_message_bytes: usize,

    /// Longest follower notification, in characters.
    pub max_notification_chars: usize,

    /// Delay between readiness polls while draining the inbox.
    pub inbox_retry_delay_ms: u64,

    /// Directory of the content-addressed resource cache.
    pub cache_dir: PathBuf,

    /// Well-known overlay key (before digesting) for moderator records.
    pub moderators_key: String,

    /// Upper bound on any structured payload accepted from a peer.
    pub max_payload_bytes: u64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            max_message_bytes: 1500,
            max_notification_chars: 140,
            inbox_retry_delay_ms: 1000,
            cache_dir: PathBuf::from("cache"),
            moderators_key: "moderators".to_string(),
            max_payload_bytes: 4 * 1024 * 1024,
        }
    }
}

impl MarketConfig {
    /// Create a config for testing (fast inbox polling).
    pub fn for_testing() -> Self {
        Self {
            inbox_retry_delay_ms: 10,
            max_payload_bytes: 256 * 1024,
            ..Self::default()
        }
    }

    /// Parse from TOML; missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Reject values that would disable the protocol.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_payload_bytes == 0 {
            return Err(ConfigError::Invalid("max_payload_bytes must be positive".to_string()));
        }
        if self.moderators_key.is_empty() {
            return Err(ConfigError::Invalid("moderators_key must not be empty".to_string()));
        }
        Ok(())
    }

    /// Inbox readiness poll delay.
    pub fn inbox_retry_delay(&self) -> Duration {
        Duration::from_millis(self.inbox_retry_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = MarketConfig::default();
        assert_eq!(config.max_message_bytes, 1500);
        assert_eq!(config.max_notification_chars, 140);
        assert_eq!(config.inbox_retry_delay(), Duration::from_secs(1));
        assert_eq!(config.moderators_key, "moderators");
    }

    #[test]
    fn test_testing_config() {
        let config = MarketConfig::for_testing();
        assert_eq!(config.inbox_retry_delay_ms, 10);
        assert_eq!(config.max_message_bytes, 1500);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = MarketConfig::from_toml_str(
            r#"
            cache_dir = "/var/lib/market/cache"
            inbox_retry_delay_ms = 250
            "#,
        )
        .unwrap();

        assert_eq!(config.cache_dir, PathBuf::from("/var/lib/market/cache"));
        assert_eq!(config.inbox_retry_delay_ms, 250);
        assert_eq!(config.max_notification_chars, 140);
    }

    #[test]
    fn test_invalid_toml_rejected() {
        assert!(matches!(
            MarketConfig::from_toml_str("max_message_bytes = \"lots\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            MarketConfig::from_toml_str("max_payload_bytes = 0"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "moderators_key = \"mods-testnet\"").unwrap();

        let config = MarketConfig::load(file.path()).unwrap();
        assert_eq!(config.moderators_key, "mods-testnet");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            MarketConfig::load("/nonexistent/market.toml"),
            Err(ConfigError::Io(_))
        ));
    }
}
