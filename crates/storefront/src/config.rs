//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `STOREFRONT_SESSION_SECRET` - Session and cart signing secret (min 32 chars, high entropy)
//! - `RAZORPAY_KEY_ID` - Razorpay API key id
//! - `RAZORPAY_KEY_SECRET` - Razorpay API key secret (also verifies payment signatures)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_DATA_DIR` - Directory holding the JSON documents (default: data)
//! - `STOREFRONT_CATALOG_PATH` - Product catalog file (default: products.json)
//! - `STOREFRONT_STATIC_DIR` - Static assets served under `/static` (default: static)
//! - `STOREFRONT_RATE_LIMIT` - Enable per-IP rate limiting (default: true)
//! - `RAZORPAY_API_BASE` - Gateway base URL (default: <https://api.razorpay.com>)
//! - `PAYMENT_CURRENCY` - Currency code sent to the gateway (default: INR)
//! - `PAYMENT_TIMEOUT_SECS` - Gateway request timeout (default: 10)
//! - `PENDING_ORDER_TTL_SECS` - How long a created order awaits payment (default: 3600)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.1)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Substrings that mark a value copied from a sample `.env` (case-insensitive).
const PLACEHOLDERS: &[&str] = &[
    "your-", "your_", "changeme", "replace", "placeholder", "example", "xxx", "todo", "insert",
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

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Session and cart-token signing secret
    pub session_secret: SecretString,
    /// Directory holding `users.json`, `orders.json` and `responses.json`
    pub data_dir: PathBuf,
    /// Product catalog JSON file
    pub catalog_path: PathBuf,
    /// Static asset directory
    pub static_dir: PathBuf,
    /// Whether per-IP rate limits are applied
    pub rate_limit: bool,
    /// How long a staged order waits for payment verification
    pub pending_order_ttl: Duration,
    /// Payment gateway configuration
    pub razorpay: RazorpayConfig,
    /// Sentry error tracking configuration
    pub sentry: SentryConfig,
}

/// Razorpay API configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct RazorpayConfig {
    /// API key id (basic auth user)
    pub key_id: String,
    /// API key secret (basic auth password and signature key)
    pub key_secret: SecretString,
    /// API base URL, without trailing slash
    pub api_base: String,
    /// ISO currency code for created orders
    pub currency: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for RazorpayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RazorpayConfig")
            .field("key_id", &self.key_id)
            .field("key_secret", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("currency", &self.currency)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Sentry error tracking configuration.
#[derive(Debug, Clone)]
pub struct SentryConfig {
    /// DSN; Sentry stays disabled when unset
    pub dsn: Option<String>,
    /// Environment tag (production, staging, ...)
    pub environment: Option<String>,
    /// Error event sample rate
    pub sample_rate: f32,
    /// Performance transaction sample rate
    pub traces_sample_rate: f32,
}

impl Default for SentryConfig {
    fn default() -> Self {
        Self {
            dsn: None,
            environment: None,
            sample_rate: 1.0,
            traces_sample_rate: 0.1,
        }
    }
}

/// A source of configuration variables.
///
/// Production reads the process environment; tests pass a map so no global
/// state is touched.
struct Vars<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    /// Value of `key`, with blank values treated as unset.
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.get(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn parsed<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(key)
            .map(|v| {
                v.trim()
                    .parse::<T>()
                    .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
            })
            .transpose()
    }

    fn parsed_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        Ok(self.parsed(key)?.unwrap_or(default))
    }

    /// A required secret that must not look like a placeholder.
    fn secret(&self, key: &str, min_len: usize) -> Result<SecretString, ConfigError> {
        let value = self.required(key)?;
        check_secret(&value, min_len)
            .map_err(|reason| ConfigError::InsecureSecret(key.to_string(), reason))?;
        Ok(SecretString::from(value))
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env is fine
        let _ = dotenvy::dotenv();
        Self::from_vars(&Vars {
            lookup: |key: &str| std::env::var(key).ok(),
        })
    }

    fn from_vars<F: Fn(&str) -> Option<String>>(vars: &Vars<F>) -> Result<Self, ConfigError> {
        let ttl_secs: u64 = vars.parsed_or("PENDING_ORDER_TTL_SECS", 3600)?;

        Ok(Self {
            host: vars.parsed_or("STOREFRONT_HOST", IpAddr::from([127, 0, 0, 1]))?,
            port: vars.parsed_or("STOREFRONT_PORT", 3000)?,
            base_url: vars.required("STOREFRONT_BASE_URL")?,
            session_secret: vars.secret("STOREFRONT_SESSION_SECRET", MIN_SESSION_SECRET_LENGTH)?,
            data_dir: vars.or("STOREFRONT_DATA_DIR", "data").into(),
            catalog_path: vars.or("STOREFRONT_CATALOG_PATH", "products.json").into(),
            static_dir: vars.or("STOREFRONT_STATIC_DIR", "static").into(),
            rate_limit: vars.parsed_or("STOREFRONT_RATE_LIMIT", true)?,
            pending_order_ttl: Duration::from_secs(ttl_secs),
            razorpay: RazorpayConfig::from_vars(vars)?,
            sentry: SentryConfig::from_vars(vars)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl RazorpayConfig {
    fn from_vars<F: Fn(&str) -> Option<String>>(vars: &Vars<F>) -> Result<Self, ConfigError> {
        let timeout_secs: u64 = vars.parsed_or("PAYMENT_TIMEOUT_SECS", 10)?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "PAYMENT_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            key_id: vars.required("RAZORPAY_KEY_ID")?,
            key_secret: vars.secret("RAZORPAY_KEY_SECRET", 1)?,
            api_base: vars
                .or("RAZORPAY_API_BASE", "https://api.razorpay.com")
                .trim_end_matches('/')
                .to_string(),
            currency: vars.or("PAYMENT_CURRENCY", "INR").to_uppercase(),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl SentryConfig {
    fn from_vars<F: Fn(&str) -> Option<String>>(vars: &Vars<F>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            dsn: vars.get("SENTRY_DSN"),
            environment: vars.get("SENTRY_ENVIRONMENT"),
            sample_rate: vars.parsed_or("SENTRY_SAMPLE_RATE", defaults.sample_rate)?,
            traces_sample_rate: vars
                .parsed_or("SENTRY_TRACES_SAMPLE_RATE", defaults.traces_sample_rate)?,
        })
    }
}

/// Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    let mut freq: HashMap<char, u32> = HashMap::new();
    let mut len = 0_u32;
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
        len += 1;
    }
    if len == 0 {
        return 0.0;
    }

    freq.values()
        .map(|&count| {
            let p = f64::from(count) / f64::from(len);
            -p * p.log2()
        })
        .sum()
}

/// Why `secret` is unfit for signing, if it is.
fn check_secret(secret: &str, min_len: usize) -> Result<(), String> {
    if secret.len() < min_len {
        return Err(format!(
            "must be at least {min_len} characters (got {})",
            secret.len()
        ));
    }

    let lower = secret.to_lowercase();
    if let Some(pattern) = PLACEHOLDERS.iter().find(|p| lower.contains(*p)) {
        return Err(format!("appears to be a placeholder (contains '{pattern}')"));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(format!(
            "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SESSION_SECRET: &str = "q8Zr2Lk5Vn9Tb1Xw6Hc3Jm7Pd4Gs0Fya";
    const KEY_SECRET: &str = "N7hQ2kVt9ZpL4xWc8RbJ5mFs";

    fn load(pairs: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let mut map: HashMap<String, String> = [
            ("STOREFRONT_BASE_URL", "https://shop.example.in"),
            ("STOREFRONT_SESSION_SECRET", SESSION_SECRET),
            ("RAZORPAY_KEY_ID", "rzp_live_abc"),
            ("RAZORPAY_KEY_SECRET", KEY_SECRET),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        for (k, v) in pairs {
            map.insert((*k).to_string(), (*v).to_string());
        }

        StorefrontConfig::from_vars(&Vars {
            lookup: |key: &str| map.get(key).cloned(),
        })
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert!(config.rate_limit);
        assert_eq!(config.pending_order_ttl, Duration::from_secs(3600));
        assert_eq!(config.razorpay.currency, "INR");
        assert_eq!(config.razorpay.api_base, "https://api.razorpay.com");
        assert!(config.sentry.dsn.is_none());
        assert!(config.is_secure());
    }

    #[test]
    fn test_overrides_are_normalized() {
        let config = load(&[
            ("STOREFRONT_PORT", " 8080 "),
            ("STOREFRONT_RATE_LIMIT", "false"),
            ("PAYMENT_CURRENCY", "inr"),
            ("RAZORPAY_API_BASE", "http://127.0.0.1:9000/"),
            ("SENTRY_DSN", "   "),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert!(!config.rate_limit);
        assert_eq!(config.razorpay.currency, "INR");
        assert_eq!(config.razorpay.api_base, "http://127.0.0.1:9000");
        assert!(config.sentry.dsn.is_none());
    }

    #[test]
    fn test_missing_and_invalid_vars() {
        assert!(matches!(
            load(&[("RAZORPAY_KEY_ID", "")]),
            Err(ConfigError::MissingEnvVar(key)) if key == "RAZORPAY_KEY_ID"
        ));
        assert!(matches!(
            load(&[("STOREFRONT_PORT", "http")]),
            Err(ConfigError::InvalidEnvVar(key, _)) if key == "STOREFRONT_PORT"
        ));
        assert!(matches!(
            load(&[("PAYMENT_TIMEOUT_SECS", "0")]),
            Err(ConfigError::InvalidEnvVar(key, _)) if key == "PAYMENT_TIMEOUT_SECS"
        ));
    }

    #[test]
    fn test_weak_secrets_are_rejected() {
        for secret in [
            "short",
            "your-session-secret-goes-here-ok",
            "abababababababababababababababab",
        ] {
            assert!(
                matches!(
                    load(&[("STOREFRONT_SESSION_SECRET", secret)]),
                    Err(ConfigError::InsecureSecret(..))
                ),
                "{secret}"
            );
        }
    }

    #[test]
    fn test_shannon_entropy() {
        assert!(shannon_entropy("").abs() < f64::EPSILON);
        assert!(shannon_entropy("aaaaaaa").abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_razorpay_config_debug_redacts_secrets() {
        let config = load(&[]).unwrap();
        let debug_output = format!("{:?}", config.razorpay);

        assert!(debug_output.contains("rzp_live_abc"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains(KEY_SECRET));
    }
}
