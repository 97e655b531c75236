//! Connection configuration
//!
//! Read from environment variables (a `.env` file is honoured by the
//! binary):
//! - `DB_DRIVER`: store driver, default `sqlite`
//! - `DATABASE_NAME`: database file path or `:memory:` (required)
//! - `SERVER_NAME`, `DB_USERNAME`, `DB_PASSWORD`: optional, unused by SQLite
//!
//! Missing required values fail fast; there are no placeholder defaults.

use std::fmt;

use thiserror::Error;

use crate::store::MEMORY_LOCATION;

pub const ENV_DRIVER: &str = "DB_DRIVER";
pub const ENV_DATABASE: &str = "DATABASE_NAME";
pub const ENV_SERVER: &str = "SERVER_NAME";
pub const ENV_USERNAME: &str = "DB_USERNAME";
pub const ENV_PASSWORD: &str = "DB_PASSWORD";

pub const DEFAULT_DRIVER: &str = "sqlite";

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required variable is unset or empty
    #[error("configuration variable '{0}' is not set")]
    ConfigurationMissing(String),
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::ConfigurationMissing(_) => "TABLOAD_CONFIGURATION_MISSING",
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Store connection parameters
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub driver: String,
    pub database: String,
    pub server: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Config {
    /// Reads the process environment.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| non_blank(&lookup, key);

        let database =
            get(ENV_DATABASE).ok_or_else(|| ConfigError::ConfigurationMissing(ENV_DATABASE.into()))?;

        Ok(Self {
            driver: driver_from_lookup(&lookup),
            database,
            server: get(ENV_SERVER),
            username: get(ENV_USERNAME),
            password: get(ENV_PASSWORD),
        })
    }

    /// Configuration for a private in-memory database
    pub fn in_memory() -> Self {
        Self {
            driver: DEFAULT_DRIVER.to_string(),
            database: MEMORY_LOCATION.to_string(),
            server: None,
            username: None,
            password: None,
        }
    }
}

fn non_blank<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|v| !v.trim().is_empty())
}

/// Configured driver name, defaulting to `sqlite`. Needs no database name.
pub fn driver_from_env() -> String {
    driver_from_lookup(&|key: &str| std::env::var(key).ok())
}

pub fn driver_from_lookup<F>(lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    non_blank(lookup, ENV_DRIVER).unwrap_or_else(|| DEFAULT_DRIVER.to_string())
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("driver", &self.driver)
            .field("database", &self.database)
            .field("server", &self.server)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
