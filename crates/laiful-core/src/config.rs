//! Configuration and settings management
//!
//! Loads shop settings from config files and environment variables.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Atlantic H2H endpoint.
pub const DEFAULT_ATLANTIC_BASE_URL: &str = "https://atlantich2h.com";
/// Idle time after which a session falls back to IDLE (30 minutes).
pub const SESSION_TTL_SECS: u64 = 1800;
/// Cooldown between network-triggering commands from one sender.
pub const RATE_LIMIT_MS: u64 = 1500;
/// Freshness window for cached price lists (5 minutes).
pub const PRICE_CACHE_TTL_SECS: u64 = 300;
/// Maximum number of cached price lists.
pub const PRICE_CACHE_MAX_SIZE: u64 = 64;

/// Shop settings loaded from environment variables
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ShopSettings {
    /// Atlantic H2H API key; every gateway call fails when absent
    pub atlantic_api_key: Option<String>,
    /// Atlantic H2H base URL
    #[serde(default = "default_atlantic_base_url")]
    pub atlantic_base_url: String,
    /// Session idle TTL in seconds
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
    /// Per-sender cooldown in milliseconds
    #[serde(default = "default_rate_limit_ms")]
    pub rate_limit_ms: u64,
    /// Price list freshness in seconds
    #[serde(default = "default_price_cache_ttl_secs")]
    pub price_cache_ttl_secs: u64,
    /// Price list cache capacity
    #[serde(default = "default_price_cache_max_size")]
    pub price_cache_max_size: u64,
    /// Optional gateway request timeout; transport default when unset
    pub gateway_timeout_secs: Option<u64>,
}

fn default_atlantic_base_url() -> String {
    DEFAULT_ATLANTIC_BASE_URL.to_string()
}

const fn default_session_ttl_secs() -> u64 {
    SESSION_TTL_SECS
}

const fn default_rate_limit_ms() -> u64 {
    RATE_LIMIT_MS
}

const fn default_price_cache_ttl_secs() -> u64 {
    PRICE_CACHE_TTL_SECS
}

const fn default_price_cache_max_size() -> u64 {
    PRICE_CACHE_MAX_SIZE
}

impl Default for ShopSettings {
    fn default() -> Self {
        Self {
            atlantic_api_key: None,
            atlantic_base_url: default_atlantic_base_url(),
            session_ttl_secs: SESSION_TTL_SECS,
            rate_limit_ms: RATE_LIMIT_MS,
            price_cache_ttl_secs: PRICE_CACHE_TTL_SECS,
            price_cache_max_size: PRICE_CACHE_MAX_SIZE,
            gateway_timeout_secs: None,
        }
    }
}

/// Build the layered configuration shared by every crate of the workspace.
///
/// # Errors
///
/// Returns a `ConfigError` if a present source cannot be read.
pub fn build_config() -> Result<Config, ConfigError> {
    let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

    Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
        // Local overrides, never checked in
        .add_source(File::with_name("config/local").required(false))
        // Eg. `APP__RATE_LIMIT_MS=2000`
        .add_source(Environment::with_prefix("APP").separator("__"))
        // Plain UPPER_SNAKE_CASE variables; empty values count as unset
        .add_source(Environment::default().ignore_empty(true))
        .build()
}

impl ShopSettings {
    /// Create new settings by loading from environment and files
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use laiful_core::config::ShopSettings;
    ///
    /// let settings = ShopSettings::new().expect("Failed to load configuration");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails.
    pub fn new() -> Result<Self, ConfigError> {
        let mut settings: Self = build_config()?.try_deserialize()?;

        // Fallback when the automatic key mapping misses the variable
        if settings.atlantic_api_key.is_none() {
            if let Ok(val) = std::env::var("ATLANTIC_API_KEY") {
                if !val.is_empty() {
                    settings.atlantic_api_key = Some(val);
                }
            }
        }

        Ok(settings)
    }

    /// Session idle TTL
    #[must_use]
    pub const fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    /// Per-sender cooldown
    #[must_use]
    pub const fn rate_limit(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }

    /// Price list freshness window
    #[must_use]
    pub const fn price_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.price_cache_ttl_secs)
    }

    /// Gateway request timeout, if configured
    #[must_use]
    pub fn gateway_timeout(&self) -> Option<Duration> {
        self.gateway_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    // Tests run sequentially to avoid environment variable race conditions
    #[test]
    fn test_config_env_loading() -> Result<(), Box<dyn std::error::Error>> {
        env::set_var("ATLANTIC_API_KEY", "secret-key");
        env::set_var("RATE_LIMIT_MS", "2500");

        let settings = ShopSettings::new()?;
        assert_eq!(settings.atlantic_api_key, Some("secret-key".to_string()));
        assert_eq!(settings.rate_limit(), Duration::from_millis(2500));
        assert_eq!(settings.atlantic_base_url, DEFAULT_ATLANTIC_BASE_URL);

        env::remove_var("ATLANTIC_API_KEY");
        env::remove_var("RATE_LIMIT_MS");

        // Empty key is treated as missing
        env::set_var("ATLANTIC_API_KEY", "");
        let settings = ShopSettings::new()?;
        assert_eq!(settings.atlantic_api_key, None);
        env::remove_var("ATLANTIC_API_KEY");
        Ok(())
    }

    #[test]
    fn test_defaults() {
        let settings = ShopSettings::default();
        assert_eq!(settings.session_ttl(), Duration::from_secs(1800));
        assert_eq!(settings.rate_limit(), Duration::from_millis(1500));
        assert_eq!(settings.price_cache_ttl(), Duration::from_secs(300));
        assert!(settings.gateway_timeout().is_none());
    }
}
