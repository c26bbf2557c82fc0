//! Web client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `LDMS_BASE_URL` - Public URL of this web client
//!
//! ## Optional
//! - `LDMS_HOST` - Bind address (default: 127.0.0.1)
//! - `LDMS_PORT` - Listen port (default: 8080)
//! - `LDMS_API_URL` - REST backend base URL (default: <http://localhost:3000/api>)
//! - `LDMS_API_TIMEOUT_SECS` - Backend request timeout (default: 10)
//! - `LDMS_SESSION_DATABASE_URL` - `SQLite` session store (default: sqlite://ldms-sessions.db?mode=rwc)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate, 0.0 to 1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate, 0.0 to 1.0 (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:3000/api";
const DEFAULT_SESSION_DATABASE_URL: &str = "sqlite://ldms-sessions.db?mode=rwc";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Web client configuration.
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the web client
    pub base_url: Url,
    /// REST backend configuration
    pub api: ApiConfig,
    /// Session store connection URL
    pub session_database_url: SecretString,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production")
    pub sentry_environment: Option<String>,
    /// Fraction of error events sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions sent to Sentry
    pub sentry_traces_sample_rate: f32,
}

/// REST backend configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL every backend path is appended to
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
}

impl WebConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("LDMS_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("LDMS_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("LDMS_PORT", "8080")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("LDMS_PORT".to_string(), e.to_string()))?;
        let base_url = parse_http_url("LDMS_BASE_URL", &get_required_env("LDMS_BASE_URL")?)?;
        let api = ApiConfig::from_env()?;
        let session_database_url = SecretString::from(get_env_or_default(
            "LDMS_SESSION_DATABASE_URL",
            DEFAULT_SESSION_DATABASE_URL,
        ));

        Ok(Self {
            host,
            port,
            base_url,
            api,
            session_database_url,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: get_sample_rate("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: get_sample_rate("SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the public URL is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.scheme() == "https"
    }
}

impl ApiConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let base_url = parse_http_url(
            "LDMS_API_URL",
            &get_env_or_default("LDMS_API_URL", DEFAULT_API_URL),
        )?;
        let timeout_secs = get_env_or_default("LDMS_API_TIMEOUT_SECS", "10")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("LDMS_API_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an absolute http(s) URL.
fn parse_http_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

/// Get a sample rate between 0.0 and 1.0.
fn get_sample_rate(key: &str, default: f32) -> Result<f32, ConfigError> {
    let Some(value) = get_optional_env(key) else {
        return Ok(default);
    };
    parse_sample_rate(key, &value)
}

fn parse_sample_rate(key: &str, value: &str) -> Result<f32, ConfigError> {
    let rate = value
        .parse::<f32>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !(0.0..=1.0).contains(&rate) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ));
    }
    Ok(rate)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> WebConfig {
        WebConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 8080,
            base_url: Url::parse("http://localhost:8080").unwrap(),
            api: ApiConfig {
                base_url: Url::parse(DEFAULT_API_URL).unwrap(),
                timeout: Duration::from_secs(10),
            },
            session_database_url: SecretString::from("sqlite::memory:"),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    #[test]
    fn test_socket_addr() {
        let addr = config().socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn test_is_secure() {
        let mut config = config();
        assert!(!config.is_secure());
        config.base_url = Url::parse("https://ldms.example.rw").unwrap();
        assert!(config.is_secure());
    }

    #[test]
    fn test_parse_http_url_rejects_other_schemes() {
        assert!(parse_http_url("TEST_URL", "http://localhost:3000/api").is_ok());
        let err = parse_http_url("TEST_URL", "ftp://localhost").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
        assert!(parse_http_url("TEST_URL", "not a url").is_err());
    }

    #[test]
    fn test_parse_sample_rate_bounds() {
        assert!((parse_sample_rate("TEST_RATE", "0.25").unwrap() - 0.25).abs() < f32::EPSILON);
        assert!(parse_sample_rate("TEST_RATE", "1.5").is_err());
        assert!(parse_sample_rate("TEST_RATE", "-0.1").is_err());
        assert!(parse_sample_rate("TEST_RATE", "often").is_err());
    }

    #[test]
    fn test_debug_redacts_session_database_url() {
        let mut config = config();
        config.session_database_url = SecretString::from("sqlite://secret-path.db");
        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("secret-path"));
    }
}
