//! Server configuration sourced from the environment.

use std::env;
use std::net::SocketAddr;

use chrono::Duration;

use givelog::outbound::persistence::PoolConfig;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_SIGNUP_TTL_DAYS: i64 = 30;
const DEFAULT_LOGIN_TTL_DAYS: i64 = 1;

/// Configuration failures that should stop startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is absent.
    #[error("missing required environment variable {name}")]
    Missing {
        /// Variable name.
        name: &'static str,
    },
    /// A variable is present but unparseable.
    #[error("invalid value for {name}: {message}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// Parse failure description.
        message: String,
    },
}

/// Everything the server needs to start, resolved once at boot.
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub signup_ttl: Duration,
    pub login_ttl: Duration,
    pub pool: PoolConfig,
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing { name })
}

fn parsed<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::Invalid {
                name,
                message: e.to_string(),
            }),
        Err(_) => Ok(None),
    }
}

/// Assemble the connection URL from `DATABASE_URL` or the discrete
/// `DB_HOST`/`DB_PORT`/`DB_NAME`/`DB_USER`/`DB_PASSWORD` variables.
fn database_url() -> Result<String, ConfigError> {
    if let Ok(url) = env::var("DATABASE_URL") {
        return Ok(url);
    }
    let host = required("DB_HOST")?;
    let port = parsed::<u16>("DB_PORT")?.unwrap_or(5432);
    let name = required("DB_NAME")?;
    let user = required("DB_USER")?;
    let password = required("DB_PASSWORD")?;
    Ok(format!("postgres://{user}:{password}@{host}:{port}/{name}"))
}

impl ServerConfig {
    /// Resolve the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = database_url()?;
        let port = parsed::<u16>("PORT")?.unwrap_or(DEFAULT_PORT);
        let jwt_secret = required("JWT_SECRET")?;
        let signup_ttl_days =
            parsed::<i64>("SIGNUP_TOKEN_TTL_DAYS")?.unwrap_or(DEFAULT_SIGNUP_TTL_DAYS);
        let login_ttl_days =
            parsed::<i64>("LOGIN_TOKEN_TTL_DAYS")?.unwrap_or(DEFAULT_LOGIN_TTL_DAYS);
        Ok(Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], port)),
            jwt_secret,
            signup_ttl: Duration::days(signup_ttl_days),
            login_ttl: Duration::days(login_ttl_days),
            pool: PoolConfig::new(database_url),
        })
    }
}
