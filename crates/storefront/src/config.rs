//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `CC_API_URL` - Commerce API base URL (default: `http://localhost:5000/api`)
//! - `CC_DATA_DIR` - Directory for persisted cart/wishlist state (default: `.classic-carry`)
//! - `CC_API_TOKEN` - Bearer token sent with API requests
//! - `CC_HEALTH_INTERVAL_SECS` - Seconds between backend health checks (default: 30)
//! - `CC_HEALTH_TIMEOUT_SECS` - Timeout for a single health check (default: 5)
//! - `CC_DELIVERY_FEE` - Delivery fee until settings are synced (default: 200)
//! - `CC_FREE_DELIVERY_THRESHOLD` - Free delivery threshold until settings are synced (default: 4000)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use classic_carry_core::{Price, PricingConfig, PricingError};
use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
const DEFAULT_DATA_DIR: &str = ".classic-carry";
const DEFAULT_HEALTH_INTERVAL_SECS: u64 = 30;
const DEFAULT_HEALTH_TIMEOUT_SECS: u64 = 5;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
///
/// Implements `Debug` manually to redact the API token.
#[derive(Clone)]
pub struct StorefrontConfig {
    /// Commerce API base URL, including the `/api` path
    pub api_url: Url,
    /// Directory holding the persisted key/value documents
    pub data_dir: PathBuf,
    /// Bearer token for authenticated endpoints
    pub api_token: Option<SecretString>,
    /// Backend health monitoring
    pub health: HealthConfig,
    /// Pricing used until the shop's general settings are fetched
    pub pricing: PricingConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl std::fmt::Debug for StorefrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontConfig")
            .field("api_url", &self.api_url.as_str())
            .field("data_dir", &self.data_dir)
            .field(
                "api_token",
                &self.api_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("health", &self.health)
            .field("pricing", &self.pricing)
            .field("sentry_dsn", &self.sentry_dsn)
            .finish()
    }
}

/// Backend health check timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthConfig {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_HEALTH_INTERVAL_SECS),
            timeout: Duration::from_secs(DEFAULT_HEALTH_TIMEOUT_SECS),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let api_url = parse_api_url(&env.or_default("CC_API_URL", DEFAULT_API_URL))?;
        let data_dir = PathBuf::from(env.or_default("CC_DATA_DIR", DEFAULT_DATA_DIR));
        let api_token = env
            .optional("CC_API_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .map(SecretString::from);

        let health = HealthConfig {
            interval: Duration::from_secs(positive_secs(
                &env,
                "CC_HEALTH_INTERVAL_SECS",
                DEFAULT_HEALTH_INTERVAL_SECS,
            )?),
            timeout: Duration::from_secs(positive_secs(
                &env,
                "CC_HEALTH_TIMEOUT_SECS",
                DEFAULT_HEALTH_TIMEOUT_SECS,
            )?),
        };

        let fee = env.parsed::<Decimal>("CC_DELIVERY_FEE")?;
        let threshold = env.parsed::<Decimal>("CC_FREE_DELIVERY_THRESHOLD")?;
        let pricing = PricingConfig::new(
            fee.map_or_else(
                || Price::from_units(PricingConfig::DEFAULT_DELIVERY_FEE),
                Price::new,
            ),
            threshold.map_or_else(
                || Price::from_units(PricingConfig::DEFAULT_FREE_DELIVERY_THRESHOLD),
                Price::new,
            ),
        )
        .map_err(|e| {
            let key = match e {
                PricingError::NegativeThreshold(_) => "CC_FREE_DELIVERY_THRESHOLD",
                _ => "CC_DELIVERY_FEE",
            };
            ConfigError::InvalidEnvVar(key.to_string(), e.to_string())
        })?;

        Ok(Self {
            api_url,
            data_dir,
            api_token,
            health,
            pricing,
            sentry_dsn: env.optional("SENTRY_DSN").filter(|s| !s.is_empty()),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Get an optional variable.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse an optional variable, rejecting values that do not parse.
    fn parsed<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key)
            .map(|raw| {
                raw.trim()
                    .parse::<T>()
                    .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
            })
            .transpose()
    }
}

fn positive_secs<F>(env: &Env<F>, key: &str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match env.parsed::<u64>(key)? {
        Some(0) => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be greater than zero".to_string(),
        )),
        Some(secs) => Ok(secs),
        None => Ok(default),
    }
}

fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim().trim_end_matches('/'))
        .map_err(|e| ConfigError::InvalidEnvVar("CC_API_URL".to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "CC_API_URL".to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.api_url.as_str(), "http://localhost:5000/api");
        assert_eq!(config.data_dir, PathBuf::from(".classic-carry"));
        assert!(config.api_token.is_none());
        assert_eq!(config.health, HealthConfig::default());
        assert_eq!(config.pricing, PricingConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("CC_API_URL", "https://shop.example.pk/api/"),
            ("CC_HEALTH_INTERVAL_SECS", "60"),
            ("CC_DELIVERY_FEE", "250"),
            ("CC_FREE_DELIVERY_THRESHOLD", "5000.50"),
        ])
        .unwrap();
        assert_eq!(config.api_url.as_str(), "https://shop.example.pk/api");
        assert_eq!(config.health.interval, Duration::from_secs(60));
        assert_eq!(config.pricing.delivery_fee(), Price::from_units(250));
        assert_eq!(
            config.pricing.free_delivery_threshold().amount(),
            Decimal::new(500_050, 2)
        );
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("CC_HEALTH_TIMEOUT_SECS", "soon")]),
            Err(ConfigError::InvalidEnvVar(key, _)) if key == "CC_HEALTH_TIMEOUT_SECS"
        ));
        assert!(load(&[("CC_HEALTH_INTERVAL_SECS", "0")]).is_err());
        assert!(load(&[("CC_API_URL", "ftp://files.example.com")]).is_err());
        assert!(load(&[("CC_API_URL", "not a url")]).is_err());
        assert!(load(&[("CC_DELIVERY_FEE", "-1")]).is_err());
        assert!(matches!(
            load(&[("CC_FREE_DELIVERY_THRESHOLD", "-10")]),
            Err(ConfigError::InvalidEnvVar(key, _)) if key == "CC_FREE_DELIVERY_THRESHOLD"
        ));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = load(&[("CC_API_TOKEN", "super_secret_bearer_token")]).unwrap();
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_bearer_token"));
    }
}
