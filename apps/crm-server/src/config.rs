//! Server configuration.

use std::env;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 54871;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Secret used to sign access tokens.
    pub jwt_secret: String,
    /// JWT expiration in hours.
    pub jwt_expiration_hours: u64,
    /// Whether `POST /api/auth/login` issues tokens without a password.
    pub dev_login: bool,
    /// Log level.
    pub log_level: String,
}

impl Config {
    /// Creates a configuration with defaults and the given signing secret.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            jwt_secret: jwt_secret.into(),
            jwt_expiration_hours: auth::DEFAULT_JWT_EXPIRATION_HOURS,
            dev_login: false,
            log_level: "info".to_string(),
        }
    }

    /// Enables or disables the development login endpoint.
    pub fn with_dev_login(mut self, enabled: bool) -> Self {
        self.dev_login = enabled;
        self
    }

    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt_secret = env::var("CRM_JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("CRM_JWT_SECRET is required"))?;

        Ok(Self {
            host: env::var("CRM_SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("CRM_SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            jwt_secret,
            jwt_expiration_hours: env::var("CRM_JWT_EXPIRATION_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(auth::DEFAULT_JWT_EXPIRATION_HOURS),
            dev_login: env::var("CRM_DEV_LOGIN")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(false),
            log_level: env::var("CRM_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Returns the server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
