use std::time::Duration;

use crate::auth::jwt::{JwtConfig, DEFAULT_ACCESS_EXPIRY_MINS};

/// Error raised when an environment variable holds an unusable value.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Log output format, selected with `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    /// Read `LOG_FORMAT`; anything other than `json` means text.
    pub fn from_env() -> Self {
        match std::env::var("LOG_FORMAT") {
            Ok(v) if v.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT validation settings.
    pub jwt: JwtConfig,
    /// Base URL of the workout tracking service.
    pub tracking_service_url: String,
    /// Base URL of the comms (notification) service.
    pub comms_service_url: String,
    /// Per-request timeout for calls to the tracking and comms services.
    pub collaborator_timeout_secs: u64,
    /// Total attempts for one tracking stats fetch.
    pub tracking_max_attempts: u32,
    /// Buffer size of the unlock notification queue.
    pub notification_queue_capacity: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                  |
    /// |-------------------------------|--------------------------|
    /// | `HOST`                        | `0.0.0.0`                |
    /// | `PORT`                        | `3000`                   |
    /// | `CORS_ORIGINS`                | `http://localhost:5173`  |
    /// | `REQUEST_TIMEOUT_SECS`        | `30`                     |
    /// | `JWT_SECRET`                  | **required**             |
    /// | `JWT_ACCESS_EXPIRY_MINS`      | `15`                     |
    /// | `TRACKING_SERVICE_URL`        | `http://localhost:8006`  |
    /// | `COMMS_SERVICE_URL`           | `http://localhost:8001`  |
    /// | `COLLABORATOR_TIMEOUT_SECS`   | `5`                      |
    /// | `TRACKING_MAX_ATTEMPTS`       | `2`                      |
    /// | `NOTIFICATION_QUEUE_CAPACITY` | `1024`                   |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let cors_origins: Vec<String> = var("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            host: var("HOST", "0.0.0.0"),
            port: parse("PORT", var("PORT", "3000"))?,
            cors_origins,
            request_timeout_secs: parse("REQUEST_TIMEOUT_SECS", var("REQUEST_TIMEOUT_SECS", "30"))?,
            jwt: JwtConfig {
                secret,
                access_token_expiry_mins: parse(
                    "JWT_ACCESS_EXPIRY_MINS",
                    var("JWT_ACCESS_EXPIRY_MINS", &DEFAULT_ACCESS_EXPIRY_MINS.to_string()),
                )?,
            },
            tracking_service_url: var("TRACKING_SERVICE_URL", "http://localhost:8006"),
            comms_service_url: var("COMMS_SERVICE_URL", "http://localhost:8001"),
            collaborator_timeout_secs: parse(
                "COLLABORATOR_TIMEOUT_SECS",
                var("COLLABORATOR_TIMEOUT_SECS", "5"),
            )?,
            tracking_max_attempts: parse("TRACKING_MAX_ATTEMPTS", var("TRACKING_MAX_ATTEMPTS", "2"))?,
            notification_queue_capacity: parse(
                "NOTIFICATION_QUEUE_CAPACITY",
                var("NOTIFICATION_QUEUE_CAPACITY", "1024"),
            )?,
        })
    }

    pub fn collaborator_timeout(&self) -> Duration {
        Duration::from_secs(self.collaborator_timeout_secs)
    }
}

fn parse<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })
}
