//! # Application Configuration
//!
//! Configuration loaded from environment variables (and an optional `.env`
//! file). It is validated on startup to fail fast if misconfigured.
//!
//! There is no global instance: build a [`Config`] once at startup with
//! [`Config::load()`] and hand it to the application state.
//!
//! ```rust,no_run
//! use lib_core::config::Config;
//!
//! let config = Config::load().expect("invalid configuration");
//! println!("listening on {}", config.bind_address());
//! ```
//!
//! ## Variables
//!
//! | variable                 | default           |
//! |--------------------------|-------------------|
//! | `APP_ENVIRONMENT`        | `development`     |
//! | `API_HOST`               | `127.0.0.1`       |
//! | `API_PORT`               | `8080`            |
//! | `ENABLE_CORS`            | `true`            |
//! | `CORS_ALLOWED_ORIGINS`   | *(any origin)*    |
//! | `JWT_SECRET`             | **required**      |
//! | `JWT_ISSUER`             | `commons-toolkit` |
//! | `JWT_ACCESS_TTL_MINUTES` | `15`              |
//! | `JWT_REFRESH_TTL_HOURS`  | `168`             |
//! | `TIMEOUT_SECONDS`        | `30`              |
//! | `LOG_LEVEL`              | `info`            |
//! | `LOG_FORMAT`             | `json`            |

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use lib_utils::envs::{get_env, get_env_bool_or, get_env_list, get_env_or, get_env_parse_or};

use crate::error::{AppError, Result};

/// Longest accepted token lifetime: ten years, in hours.
const MAX_TTL_HOURS: i64 = 3650 * 24;

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per event
    #[default]
    Json,
    /// Human-readable text
    Console,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "console" | "text" => Ok(LogFormat::Console),
            other => Err(format!("unknown log format: {}", other)),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// Deployment environment name (`development`, `production`, ...)
    pub environment: String,

    /// Interface to bind the HTTP server to
    pub host: String,

    /// Port to bind the HTTP server to
    pub port: u16,

    /// Whether the CORS layer is installed
    pub enable_cors: bool,

    /// Allowed CORS origins; empty or `*` allows any origin
    pub allowed_origins: Vec<String>,

    /// Secret key for JWT signing and verification
    ///
    /// **Must be at least 32 characters long** for security.
    pub jwt_secret: String,

    /// Value of the `iss` claim
    pub jwt_issuer: String,

    /// Access token validity in minutes
    pub jwt_access_ttl_minutes: i64,

    /// Refresh token validity in hours
    pub jwt_refresh_ttl_hours: i64,

    /// Timeout for outbound HTTP calls, in seconds
    pub timeout_secs: u64,

    /// Default tracing filter (`trace`, `debug`, `info`, `warn`, `error`)
    pub log_level: String,

    /// Tracing output format
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8080,
            enable_cors: true,
            allowed_origins: Vec::new(),
            jwt_secret: String::new(),
            jwt_issuer: "commons-toolkit".to_string(),
            jwt_access_ttl_minutes: 15,
            jwt_refresh_ttl_hours: 24 * 7,
            timeout_secs: 30,
            log_level: "info".to_string(),
            log_format: LogFormat::Json,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("environment", &self.environment)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("enable_cors", &self.enable_cors)
            .field("allowed_origins", &self.allowed_origins)
            .field("jwt_secret", &"***REDACTED***")
            .field("jwt_issuer", &self.jwt_issuer)
            .field("jwt_access_ttl_minutes", &self.jwt_access_ttl_minutes)
            .field("jwt_refresh_ttl_hours", &self.jwt_refresh_ttl_hours)
            .field("timeout_secs", &self.timeout_secs)
            .field("log_level", &self.log_level)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl Config {
    /// Load `.env` if present, read the environment, and validate.
    pub fn load() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!("[CONFIG] Loaded {}", path.display()),
            Err(e) if e.not_found() => {
                tracing::debug!("[CONFIG] No .env file, using process environment")
            }
            Err(e) => return Err(AppError::Config(format!("failed to read .env: {}", e))),
        }

        let config = Self::from_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables.
    ///
    /// Unset variables take their defaults; set but unparseable ones are errors.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            environment: get_env_or("APP_ENVIRONMENT", &defaults.environment),
            host: get_env_or("API_HOST", &defaults.host),
            port: get_env_parse_or("API_PORT", defaults.port)?,
            enable_cors: get_env_bool_or("ENABLE_CORS", defaults.enable_cors)?,
            allowed_origins: get_env_list("CORS_ALLOWED_ORIGINS"),
            jwt_secret: get_env("JWT_SECRET")?,
            jwt_issuer: get_env_or("JWT_ISSUER", &defaults.jwt_issuer),
            jwt_access_ttl_minutes: get_env_parse_or(
                "JWT_ACCESS_TTL_MINUTES",
                defaults.jwt_access_ttl_minutes,
            )?,
            jwt_refresh_ttl_hours: get_env_parse_or(
                "JWT_REFRESH_TTL_HOURS",
                defaults.jwt_refresh_ttl_hours,
            )?,
            timeout_secs: get_env_parse_or("TIMEOUT_SECONDS", defaults.timeout_secs)?,
            log_level: get_env_or("LOG_LEVEL", &defaults.log_level).to_lowercase(),
            log_format: get_env_parse_or("LOG_FORMAT", defaults.log_format)?,
        })
    }

    /// Validate configuration values against security rules.
    pub fn validate(&self) -> Result<()> {
        if self.jwt_secret.len() < 32 {
            return Err(AppError::Config(
                "JWT_SECRET must be at least 32 characters long".to_string(),
            ));
        }

        if self.jwt_access_ttl_minutes < 1 {
            return Err(AppError::Config("JWT_ACCESS_TTL_MINUTES must be positive".to_string()));
        }

        if self.jwt_access_ttl_minutes > MAX_TTL_HOURS * 60
            || self.jwt_refresh_ttl_hours > MAX_TTL_HOURS
        {
            return Err(AppError::Config("JWT lifetimes cannot exceed ten years".to_string()));
        }

        let refresh_minutes = self.jwt_refresh_ttl_hours.saturating_mul(60);
        if refresh_minutes < self.jwt_access_ttl_minutes {
            return Err(AppError::Config(
                "JWT_REFRESH_TTL_HOURS must not be shorter than the access token lifetime"
                    .to_string(),
            ));
        }

        if self.jwt_issuer.trim().is_empty() {
            return Err(AppError::Config("JWT_ISSUER cannot be empty".to_string()));
        }

        if self.timeout_secs == 0 {
            return Err(AppError::Config("TIMEOUT_SECONDS must be positive".to_string()));
        }

        Ok(())
    }

    /// `host:port` for the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// True when CORS should accept any origin.
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.is_empty() || self.allowed_origins.iter().any(|o| o == "*")
    }

    /// Outbound HTTP timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
