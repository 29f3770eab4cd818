//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required (postgres storage)
//! - `HOSPITAL_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `HOSPITAL_STORAGE` - `postgres` (default) or `memory`
//! - `HOSPITAL_HOST` - Bind address (default: 127.0.0.1)
//! - `HOSPITAL_PORT` - Listen port (default: 8080, falls back to `PORT`)
//! - `HOSPITAL_MEDICINE_CACHE_TTL_SECS` - Medicine listing cache TTL (default: 300, 0 disables)
//! - `HOSPITAL_REQUEST_TIMEOUT_SECS` - Per-request deadline (default: 30)
//! - `HOSPITAL_CORS_ORIGINS` - Comma-separated allowed origins (default: any origin)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Traces sample rate (default: 1.0)

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: &str = "8080";
const DEFAULT_MEDICINE_CACHE_TTL_SECS: &str = "300";
const DEFAULT_REQUEST_TIMEOUT_SECS: &str = "30";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Where hospital records live.
#[derive(Clone)]
pub enum StorageConfig {
    /// `PostgreSQL` at the given URL (contains password).
    Postgres { database_url: SecretString },
    /// In-process store seeded with demo data. Lost on restart.
    Memory,
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Postgres { .. } => f
                .debug_struct("Postgres")
                .field("database_url", &"[REDACTED]")
                .finish(),
            Self::Memory => f.write_str("Memory"),
        }
    }
}

/// Hospital server configuration.
#[derive(Debug, Clone)]
pub struct HospitalConfig {
    /// Storage backend
    pub storage: StorageConfig,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// TTL of the medicine listing cache; zero disables it
    pub medicine_cache_ttl: Duration,
    /// Deadline applied to every request
    pub request_timeout: Duration,
    /// Allowed CORS origins; `None` allows any origin
    pub cors_origins: Option<Vec<String>>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

impl HospitalConfig {
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
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let storage = match env.or_default("HOSPITAL_STORAGE", "postgres").as_str() {
            "postgres" => StorageConfig::Postgres {
                database_url: env.required_with_fallback("HOSPITAL_DATABASE_URL", "DATABASE_URL")?,
            },
            "memory" => StorageConfig::Memory,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "HOSPITAL_STORAGE".to_string(),
                    format!("expected 'postgres' or 'memory', got '{other}'"),
                ));
            }
        };

        let host = env
            .or_default("HOSPITAL_HOST", DEFAULT_HOST)
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("HOSPITAL_HOST".to_string(), e.to_string()))?;
        let port = env
            .optional("HOSPITAL_PORT")
            .or_else(|| env.optional("PORT"))
            .unwrap_or_else(|| DEFAULT_PORT.to_string())
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("HOSPITAL_PORT".to_string(), e.to_string()))?;

        let medicine_cache_ttl =
            env.seconds("HOSPITAL_MEDICINE_CACHE_TTL_SECS", DEFAULT_MEDICINE_CACHE_TTL_SECS)?;
        let request_timeout =
            env.seconds("HOSPITAL_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?;
        let cors_origins = env
            .optional("HOSPITAL_CORS_ORIGINS")
            .map(|raw| parse_origins(&raw))
            .filter(|origins| !origins.is_empty());

        let sentry_dsn = env.optional("SENTRY_DSN");
        let sentry_environment = env.optional("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = env
            .optional("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = env
            .optional("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            storage,
            host,
            port,
            medicine_cache_ttl,
            request_timeout,
            cors_origins,
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

    /// Configuration for an in-memory server on an ephemeral port.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            storage: StorageConfig::Memory,
            host: IpAddr::from([127, 0, 0, 1]),
            port: 0,
            medicine_cache_ttl: Duration::from_secs(300),
            request_timeout: Duration::from_secs(30),
            cors_origins: None,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    /// Get an optional variable, treating empty as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Get a required secret with a fallback variable (e.g. `DATABASE_URL` set by the host).
    fn required_with_fallback(
        &self,
        primary_key: &str,
        fallback_key: &str,
    ) -> Result<SecretString, ConfigError> {
        self.optional(primary_key)
            .or_else(|| self.optional(fallback_key))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar(primary_key.to_string()))
    }

    fn seconds(&self, key: &str, default: &str) -> Result<Duration, ConfigError> {
        self.or_default(key, default)
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<HospitalConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        HospitalConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_with_database_url() {
        let config = load(&[("HOSPITAL_DATABASE_URL", "postgres://localhost/hospital")]).unwrap();

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8080");
        assert_eq!(config.medicine_cache_ttl, Duration::from_secs(300));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.cors_origins.is_none());
        assert!((config.sentry_sample_rate - 1.0).abs() < f32::EPSILON);
        match config.storage {
            StorageConfig::Postgres { database_url } => {
                assert_eq!(database_url.expose_secret(), "postgres://localhost/hospital");
            }
            StorageConfig::Memory => panic!("expected postgres storage"),
        }
    }

    #[test]
    fn test_database_url_fallback_and_port_fallback() {
        let config = load(&[("DATABASE_URL", "postgres://fly/db"), ("PORT", "9000")]).unwrap();
        assert_eq!(config.port, 9000);
        assert!(matches!(config.storage, StorageConfig::Postgres { .. }));
    }

    #[test]
    fn test_missing_database_url() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "HOSPITAL_DATABASE_URL"));
    }

    #[test]
    fn test_memory_storage_needs_no_database() {
        let config = load(&[
            ("HOSPITAL_STORAGE", "memory"),
            ("HOSPITAL_MEDICINE_CACHE_TTL_SECS", "0"),
            ("HOSPITAL_CORS_ORIGINS", "http://localhost:5173, https://klinik.example.com,"),
        ])
        .unwrap();

        assert!(matches!(config.storage, StorageConfig::Memory));
        assert!(config.medicine_cache_ttl.is_zero());
        assert_eq!(
            config.cors_origins.unwrap(),
            vec!["http://localhost:5173", "https://klinik.example.com"]
        );
    }

    #[test]
    fn test_invalid_values() {
        let err = load(&[("HOSPITAL_STORAGE", "sqlite")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));

        let err = load(&[("HOSPITAL_STORAGE", "memory"), ("HOSPITAL_PORT", "http")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "HOSPITAL_PORT"));
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let config = load(&[("HOSPITAL_DATABASE_URL", "postgres://admin:hunter2@db/hospital")]).unwrap();
        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("hunter2"));
    }
}
