// Application configuration loaded from environment variables

use crate::auth::{
    password::{DEFAULT_COST_FACTOR, DEFAULT_MEMORY_KIB},
    token::DEFAULT_TOKEN_TTL_SECONDS,
};
use thiserror::Error;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const MAX_SALT_ROUNDS: u32 = 64;
/// Ten years
pub const MAX_TOKEN_TTL_SECONDS: i64 = 10 * 365 * 86_400;

/// Configuration errors, reported before the server binds
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub salt_rounds: u32,
    pub hash_memory_kib: u32,
    pub token_ttl_seconds: i64,
    /// Absent means accounts are kept in memory
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    /// Read the configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through `lookup`; blank values count as unset
    ///
    /// `JWT_SECRET` is kept byte for byte, everything else is trimmed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let salt_rounds = parse_or("SALT_ROUNDS", get("SALT_ROUNDS"), DEFAULT_COST_FACTOR)?;
        if !(1..=MAX_SALT_ROUNDS).contains(&salt_rounds) {
            return Err(invalid(
                "SALT_ROUNDS",
                salt_rounds.to_string(),
                format!("must be between 1 and {}", MAX_SALT_ROUNDS),
            ));
        }

        let hash_memory_kib =
            parse_or("HASH_MEMORY_KIB", get("HASH_MEMORY_KIB"), DEFAULT_MEMORY_KIB)?;
        if hash_memory_kib < 8 {
            return Err(invalid(
                "HASH_MEMORY_KIB",
                hash_memory_kib.to_string(),
                "must be at least 8".to_string(),
            ));
        }

        let token_ttl_seconds = parse_or(
            "TOKEN_TTL_SECONDS",
            get("TOKEN_TTL_SECONDS"),
            DEFAULT_TOKEN_TTL_SECONDS,
        )?;
        if !(1..=MAX_TOKEN_TTL_SECONDS).contains(&token_ttl_seconds) {
            return Err(invalid(
                "TOKEN_TTL_SECONDS",
                token_ttl_seconds.to_string(),
                format!("must be between 1 and {}", MAX_TOKEN_TTL_SECONDS),
            ));
        }

        let port = parse_or("PORT", get("PORT"), DEFAULT_PORT)?;

        Ok(Self {
            jwt_secret,
            salt_rounds,
            hash_memory_kib,
            token_ttl_seconds,
            database_url: get("DATABASE_URL"),
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
        })
    }

    /// `host:port` to bind the listener to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|e: T::Err| invalid(name, value.clone(), e.to_string())),
    }
}

fn invalid(name: &'static str, value: String, reason: String) -> ConfigError {
    ConfigError::Invalid { name, value, reason }
}
