//! Application configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPIFY_API_KEY` - Shopify app API key (OAuth client ID)
//! - `SHOPIFY_API_SECRET` - Shopify app API secret (OAuth client secret, HMAC key)
//! - `APP_BASE_URL` - Public URL of this app, used for the OAuth redirect
//!
//! ## Optional
//! - `HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` - Listen port (default: 3000)
//! - `SHOPIFY_API_VERSION` - Admin API version (default: 2025-01)
//! - `SHOPIFY_SCOPES` - Comma-separated OAuth scopes (default: `read_orders`)
//! - `SHOPIFY_ORIGIN_OVERRIDE` - Send every shop call to this origin instead of
//!   `https://{shop}` (local proxies and tests)
//! - `HFD_API_URL` - HFD shipment endpoint (default: `https://ws2.hfd.co.il/rest/v2/parcels`)
//! - `HTTP_TIMEOUT_SECS` - Timeout for every outbound call (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_API_VERSION: &str = "2025-01";
const DEFAULT_SCOPES: &str = "read_orders";
const DEFAULT_HFD_API_URL: &str = "https://ws2.hfd.co.il/rest/v2/parcels";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the app (no trailing slash)
    pub base_url: String,
    /// Shopify app configuration
    pub shopify: ShopifyAppConfig,
    /// HFD courier configuration
    pub courier: CourierConfig,
    /// Timeout applied to every outbound HTTP call
    pub http_timeout: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Shopify app (OAuth client) configuration.
///
/// Implements `Debug` manually to redact the API secret.
#[derive(Clone)]
pub struct ShopifyAppConfig {
    /// App API key (OAuth client ID)
    pub api_key: String,
    /// App API secret (OAuth client secret, also the callback HMAC key)
    pub api_secret: SecretString,
    /// Admin API version (e.g., 2025-01)
    pub api_version: String,
    /// Scopes requested during OAuth
    pub scopes: Vec<String>,
    /// Origin used instead of `https://{shop}` when set
    pub origin_override: Option<String>,
}

impl std::fmt::Debug for ShopifyAppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyAppConfig")
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("api_version", &self.api_version)
            .field("scopes", &self.scopes)
            .field("origin_override", &self.origin_override)
            .finish()
    }
}

/// HFD courier API configuration.
///
/// Merchant tokens are not part of the config; they are saved per store.
#[derive(Debug, Clone)]
pub struct CourierConfig {
    /// Shipment creation endpoint
    pub api_url: String,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("HOST", "0.0.0.0")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PORT".to_string(), e.to_string()))?;
        let base_url = parse_base_url(&get_required_env("APP_BASE_URL")?, "APP_BASE_URL")?;

        let shopify = ShopifyAppConfig::from_env()?;
        let courier = CourierConfig::from_env()?;
        let http_timeout = get_env_or_default(
            "HTTP_TIMEOUT_SECS",
            &DEFAULT_HTTP_TIMEOUT_SECS.to_string(),
        )
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| ConfigError::InvalidEnvVar("HTTP_TIMEOUT_SECS".to_string(), e.to_string()))?;

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.1);

        Ok(Self {
            host,
            port,
            base_url,
            shopify,
            courier,
            http_timeout,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// OAuth redirect URI registered with Shopify.
    #[must_use]
    pub fn oauth_redirect_uri(&self) -> String {
        format!("{}/auth/callback", self.base_url)
    }
}

impl ShopifyAppConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let scopes = parse_scopes(&get_env_or_default("SHOPIFY_SCOPES", DEFAULT_SCOPES));
        let origin_override = get_optional_env("SHOPIFY_ORIGIN_OVERRIDE")
            .map(|origin| parse_base_url(&origin, "SHOPIFY_ORIGIN_OVERRIDE"))
            .transpose()?;

        Ok(Self {
            api_key: get_required_env("SHOPIFY_API_KEY")?,
            api_secret: get_validated_secret("SHOPIFY_API_SECRET")?,
            api_version: get_env_or_default("SHOPIFY_API_VERSION", DEFAULT_API_VERSION),
            scopes,
            origin_override,
        })
    }
}

impl CourierConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let api_url = get_env_or_default("HFD_API_URL", DEFAULT_HFD_API_URL);
        Url::parse(&api_url)
            .map_err(|e| ConfigError::InvalidEnvVar("HFD_API_URL".to_string(), e.to_string()))?;
        Ok(Self { api_url })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable, treating empty as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate an absolute http(s) URL and strip any trailing slash.
fn parse_base_url(value: &str, var_name: &str) -> Result<String, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(value.trim_end_matches('/').to_string())
}

/// Split a comma-separated scope list.
fn parse_scopes(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the secret from the Shopify partner dashboard."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        AppConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "https://hfd.example.app".to_string(),
            shopify: ShopifyAppConfig {
                api_key: "test_api_key".to_string(),
                api_secret: SecretString::from("shpss_9f8e7d6c5b4a"),
                api_version: DEFAULT_API_VERSION.to_string(),
                scopes: vec!["read_orders".to_string()],
                origin_override: None,
            },
            courier: CourierConfig {
                api_url: DEFAULT_HFD_API_URL.to_string(),
            },
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
        }
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-secret-here", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("3f9a1c7e5b2d8046af1e9c3b7d5a2f68", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_parse_base_url_strips_trailing_slash() {
        assert_eq!(
            parse_base_url("https://hfd.example.app/", "APP_BASE_URL").unwrap(),
            "https://hfd.example.app"
        );
    }

    #[test]
    fn test_parse_base_url_rejects_non_http() {
        assert!(parse_base_url("ftp://hfd.example.app", "APP_BASE_URL").is_err());
        assert!(parse_base_url("not a url", "APP_BASE_URL").is_err());
    }

    #[test]
    fn test_parse_scopes() {
        assert_eq!(
            parse_scopes("read_orders, write_fulfillments,,"),
            vec!["read_orders".to_string(), "write_fulfillments".to_string()]
        );
    }

    #[test]
    fn test_socket_addr_and_redirect_uri() {
        let config = config();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
        assert_eq!(
            config.oauth_redirect_uri(),
            "https://hfd.example.app/auth/callback"
        );
    }

    #[test]
    fn test_shopify_config_debug_redacts_secret() {
        let debug_output = format!("{:?}", config().shopify);

        assert!(debug_output.contains("test_api_key"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("shpss_9f8e7d6c5b4a"));
    }
}
