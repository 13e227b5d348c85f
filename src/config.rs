use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "sqlite:data/tagmark.db";
const DEFAULT_WIKIPEDIA_API_URL: &str = "https://en.wikipedia.org/w/api.php";
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub auth: AuthConfig,
    pub cors_origins: Vec<String>,
    pub lookup: LookupConfig,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl: chrono::Duration,
    pub bcrypt_cost: u32,
}

/// Settings for the encyclopedia lookup used by tag suggestion.
#[derive(Debug, Clone)]
pub struct LookupConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub timeout: Duration,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: DEFAULT_WIKIPEDIA_API_URL.to_string(),
            timeout: Duration::from_millis(3000),
        }
    }
}

impl Config {
    /// Read configuration from the process environment.
    ///
    /// Call `dotenvy::dotenv()` first if a `.env` file should be honoured.
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let token_ttl = token_ttl(parse_var("TOKEN_TTL_MINUTES", 60)?)?;
        let lookup_timeout_ms: u64 = parse_var("LOOKUP_TIMEOUT_MS", 3000)?;

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| DEFAULT_CORS_ORIGIN.to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            bind_addr: parse_var("BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 3000)))?,
            auth: AuthConfig {
                jwt_secret,
                token_ttl,
                bcrypt_cost: parse_var("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            },
            cors_origins,
            lookup: LookupConfig {
                enabled: parse_var("AUTO_TAG_LOOKUP", true)?,
                endpoint: env::var("WIKIPEDIA_API_URL")
                    .unwrap_or_else(|_| DEFAULT_WIKIPEDIA_API_URL.to_string()),
                timeout: Duration::from_millis(lookup_timeout_ms),
            },
        })
    }
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}

fn token_ttl(minutes: i64) -> Result<chrono::Duration, ConfigError> {
    chrono::Duration::try_minutes(minutes)
        .filter(|ttl| *ttl > chrono::Duration::zero())
        .ok_or_else(|| ConfigError::Invalid {
            name: "TOKEN_TTL_MINUTES",
            value: minutes.to_string(),
        })
}
