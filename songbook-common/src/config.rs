//! Service configuration types
//!
//! Values are resolved by the binary (command line, then environment, then
//! defaults) and validated here before anything touches the database.

use crate::{Error, Result};
use std::fmt;

/// Environment variable holding the listening port
pub const PORT_ENV: &str = "PORT";
/// Environment variable holding the storage connection string
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
/// Environment variable holding the runtime environment name
pub const ENVIRONMENT_ENV: &str = "APP_ENV";
/// Fallback name for the runtime environment, read when `APP_ENV` is unset
pub const LEGACY_ENVIRONMENT_ENV: &str = "NODE_ENV";

/// Default listening port
pub const DEFAULT_PORT: u16 = 5000;

/// Named runtime environment
///
/// Only `production` suppresses failure detail in error responses.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RuntimeEnvironment {
    #[default]
    Development,
    Production,
    Test,
    Other(String),
}

impl RuntimeEnvironment {
    /// Parse an environment name; blank input falls back to development
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "" | "development" | "dev" => RuntimeEnvironment::Development,
            "production" | "prod" => RuntimeEnvironment::Production,
            "test" => RuntimeEnvironment::Test,
            other => RuntimeEnvironment::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RuntimeEnvironment::Development => "development",
            RuntimeEnvironment::Production => "production",
            RuntimeEnvironment::Test => "test",
            RuntimeEnvironment::Other(name) => name,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, RuntimeEnvironment::Production)
    }
}

impl fmt::Display for RuntimeEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub port: u16,
    pub database_url: String,
    pub environment: RuntimeEnvironment,
}

impl ServiceConfig {
    /// Build a configuration, rejecting a blank or non-SQLite database URL
    pub fn new(
        port: u16,
        database_url: Option<String>,
        environment: RuntimeEnvironment,
    ) -> Result<Self> {
        let database_url = database_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                Error::Config(format!("Environment variable {} is not defined", DATABASE_URL_ENV))
            })?;

        if !database_url.starts_with("sqlite:") {
            return Err(Error::Config(format!(
                "Unsupported database URL (expected sqlite:...): {}",
                database_url
            )));
        }

        Ok(Self {
            port,
            database_url,
            environment,
        })
    }
}
