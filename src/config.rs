use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;

/// Application configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Subscriber record store connection (required for command handling)
    pub subscriber_store: Option<SubscriberStoreConfig>,
    /// Rate-limit counter store connection (falls back to in-process)
    pub counter_store: Option<CounterStoreConfig>,
    /// Rate limiting configuration
    pub rate_limit: RateLimitConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    /// Server host (default: 0.0.0.0)
    pub host: String,
    /// Server port (default: 3000)
    pub port: u16,
}

/// Subscriber record store connection settings.
///
/// Both fields are required; when the section is absent entirely, the
/// handler answers every message with the configuration-error reply.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SubscriberStoreConfig {
    /// Record store base URL
    pub url: String,
    /// Service credential for the record store API
    pub service_key: String,
    /// Table holding subscriber records (default: subscribers)
    #[serde(default = "default_table")]
    pub table: String,
}

fn default_table() -> String {
    "subscribers".to_string()
}

/// Counter store connection settings (Redis-over-REST).
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CounterStoreConfig {
    /// Counter store base URL
    pub url: String,
    /// Bearer token for the counter store API
    pub token: String,
}

/// Rate limiting configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RateLimitConfig {
    /// Enable rate limiting (default: true)
    pub enabled: bool,
    /// Maximum counted messages per sender per window (default: 5)
    pub max_requests: u32,
    /// Window duration in seconds (default: 60)
    pub window_seconds: u64,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Log level (default: info)
    pub level: String,
    /// Log format: json or pretty (default: pretty)
    pub format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: 5,
            window_seconds: 60,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            // Start with default configuration
            .add_source(Config::try_from(&AppConfig::default())?)
            // Add configuration file based on environment
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add local configuration file (gitignored)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables (prefixed with OOTD_)
            .add_source(Environment::with_prefix("OOTD").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            subscriber_store: None,
            counter_store: None,
            rate_limit: RateLimitConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enforce_the_documented_threshold() {
        let config = AppConfig::default();
        assert!(config.rate_limit.enabled);
        assert_eq!(config.rate_limit.max_requests, 5);
        assert_eq!(config.rate_limit.window_seconds, 60);
    }

    #[test]
    fn store_settings_default_to_absent() {
        let config = AppConfig::default();
        assert!(config.subscriber_store.is_none());
        assert!(config.counter_store.is_none());
    }

    #[test]
    fn table_name_has_a_default() {
        let parsed: SubscriberStoreConfig = serde_json::from_str(
            r#"{"url":"https://db.example.com","service_key":"secret"}"#,
        )
        .unwrap();
        assert_eq!(parsed.table, "subscribers");
    }
}
