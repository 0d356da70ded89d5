//! Server configuration.

use std::time::Duration;

use ratekeeper_fx::{RateCacheConfig, RateServiceConfig};
use thiserror::Error;

/// Configuration problems detected at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Listen port cannot be 0")]
    ZeroPort,

    #[error("CACHE_TTL_MS cannot be negative, got {0}")]
    NegativeTtl(i64),

    #[error("Repository timeout cannot be 0")]
    ZeroRepositoryTimeout,

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Main server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address.
    pub listen_addr: String,
    /// Listen port.
    pub listen_port: u16,
    /// Postgres URL. The in-memory repository is used when unset.
    pub database_url: Option<String>,
    /// Cache TTL in milliseconds. Zero disables caching.
    pub cache_ttl_ms: i64,
    /// Upper bound on each repository call.
    pub repository_timeout: Duration,
    /// Insert the default rates on startup if they are missing.
    pub seed_default_rates: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0".to_string(),
            listen_port: 5110,
            database_url: None,
            cache_ttl_ms: 30_000,
            repository_timeout: Duration::from_secs(5),
            seed_default_rates: true,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables (and `.env`, if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = lookup("RATEKEEPER_LISTEN_ADDR") {
            config.listen_addr = addr;
        }

        if let Some(port) = lookup("PORT") {
            config.listen_port = parse_var("PORT", &port)?;
        }

        if let Some(url) = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()) {
            config.database_url = Some(url);
        }

        if let Some(ttl) = lookup("CACHE_TTL_MS") {
            config.cache_ttl_ms = parse_var("CACHE_TTL_MS", &ttl)?;
        }

        if let Some(timeout) = lookup("REPOSITORY_TIMEOUT_MS") {
            config.repository_timeout =
                Duration::from_millis(parse_var("REPOSITORY_TIMEOUT_MS", &timeout)?);
        }

        if let Some(seed) = lookup("SEED_DEFAULT_RATES") {
            config.seed_default_rates = seed != "false" && seed != "0";
        }

        Ok(config)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.listen_port == 0 {
            return Err(ConfigError::ZeroPort);
        }

        if self.cache_ttl_ms < 0 {
            return Err(ConfigError::NegativeTtl(self.cache_ttl_ms));
        }

        if self.repository_timeout.is_zero() {
            return Err(ConfigError::ZeroRepositoryTimeout);
        }

        Ok(())
    }

    /// Settings for the rate service.
    pub fn rate_service_config(&self) -> RateServiceConfig {
        RateServiceConfig {
            cache: RateCacheConfig::from_millis(self.cache_ttl_ms),
            repository_timeout: self.repository_timeout,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.rate_service_config().cache.is_enabled());
    }

    #[test]
    fn test_from_lookup() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("PORT", "8080"),
            ("CACHE_TTL_MS", "0"),
            ("DATABASE_URL", "postgres://localhost/rates"),
            ("SEED_DEFAULT_RATES", "false"),
        ]))
        .unwrap();

        assert_eq!(config.listen_port, 8080);
        assert_eq!(config.cache_ttl_ms, 0);
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/rates"));
        assert!(!config.seed_default_rates);
        assert!(!config.rate_service_config().cache.is_enabled());
    }

    #[test]
    fn test_blank_database_url_means_in_memory() {
        let config = ServerConfig::from_lookup(lookup_from(&[("DATABASE_URL", "  ")])).unwrap();
        assert!(config.database_url.is_none());
    }

    #[test]
    fn test_unparseable_value() {
        let err = ServerConfig::from_lookup(lookup_from(&[("CACHE_TTL_MS", "soon")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name: "CACHE_TTL_MS", .. }));
    }

    #[test]
    fn test_invalid_config() {
        let mut config = ServerConfig::default();
        config.listen_port = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroPort));

        let mut config = ServerConfig::default();
        config.cache_ttl_ms = -1;
        assert_eq!(config.validate(), Err(ConfigError::NegativeTtl(-1)));
    }
}
