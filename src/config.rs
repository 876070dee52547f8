use chrono::Duration;
use thiserror::Error;

/// Application configuration, loaded once at startup and injected into
/// components. No other module reads the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Secret used to sign and verify access tokens
    pub access_secret: String,
    /// Secret used to sign and verify refresh tokens
    pub refresh_secret: String,
    /// Access token lifetime in seconds
    pub access_ttl_secs: u64,
    /// Refresh token lifetime in seconds
    pub refresh_ttl_secs: u64,
    /// Postgres connection string; absent selects the in-memory backends
    pub database_url: Option<String>,
    /// Address the HTTP server binds to
    pub bind_addr: String,
    /// Whether cookies carry the Secure attribute
    pub secure_cookies: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let access_secret = std::env::var("ACCESS_TOKEN_SECRET")
            .map_err(|_| ConfigError::Missing("ACCESS_TOKEN_SECRET"))?;

        let refresh_secret = std::env::var("REFRESH_TOKEN_SECRET")
            .map_err(|_| ConfigError::Missing("REFRESH_TOKEN_SECRET"))?;

        if access_secret.is_empty() {
            return Err(ConfigError::Invalid("ACCESS_TOKEN_SECRET must not be empty"));
        }
        if refresh_secret.is_empty() {
            return Err(ConfigError::Invalid(
                "REFRESH_TOKEN_SECRET must not be empty",
            ));
        }
        // One compromised secret must not be able to forge the other token type
        if access_secret == refresh_secret {
            return Err(ConfigError::Invalid(
                "ACCESS_TOKEN_SECRET and REFRESH_TOKEN_SECRET must differ",
            ));
        }

        let access_ttl_secs = std::env::var("ACCESS_TOKEN_TTL_SECS")
            .unwrap_or_else(|_| "900".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("ACCESS_TOKEN_TTL_SECS"))?;

        let refresh_ttl_secs = std::env::var("REFRESH_TOKEN_TTL_SECS")
            .unwrap_or_else(|_| "604800".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("REFRESH_TOKEN_TTL_SECS"))?;

        let database_url = std::env::var("DATABASE_URL").ok();

        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let secure_cookies = std::env::var("SECURE_COOKIES")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("SECURE_COOKIES"))?;

        Ok(Self {
            access_secret,
            refresh_secret,
            access_ttl_secs,
            refresh_ttl_secs,
            database_url,
            bind_addr,
            secure_cookies,
        })
    }

    /// Access token lifetime as a chrono duration
    pub fn access_ttl(&self) -> Duration {
        Duration::seconds(self.access_ttl_secs as i64)
    }

    /// Refresh token lifetime as a chrono duration
    pub fn refresh_ttl(&self) -> Duration {
        Duration::seconds(self.refresh_ttl_secs as i64)
    }
}
