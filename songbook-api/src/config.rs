//! Command-line and environment configuration for songbook-api
//!
//! Priority: command-line flag, then environment variable (including values
//! loaded from `.env`), then compiled default. `DATABASE_URL` has no default.
//! `NODE_ENV` is honoured for the environment name when `APP_ENV` is unset.

use clap::Parser;
use songbook_common::config::{
    RuntimeEnvironment, ServiceConfig, DATABASE_URL_ENV, DEFAULT_PORT, ENVIRONMENT_ENV,
    LEGACY_ENVIRONMENT_ENV, PORT_ENV,
};
use songbook_common::Result;

/// Command-line arguments for songbook-api
#[derive(Parser, Debug)]
#[command(name = "songbook-api")]
#[command(about = "Song catalog microservice")]
#[command(version)]
pub struct CliArgs {
    /// Port to listen on
    #[arg(short, long, env = PORT_ENV, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// SQLite connection string, e.g. sqlite://songs.db
    #[arg(long, env = DATABASE_URL_ENV)]
    pub database_url: Option<String>,

    /// Runtime environment name, development when unset; only "production"
    /// hides error detail
    #[arg(short, long, env = ENVIRONMENT_ENV)]
    pub environment: Option<String>,

    /// Environment name under its older variable
    #[arg(long, env = LEGACY_ENVIRONMENT_ENV, hide = true)]
    pub node_env: Option<String>,
}

impl CliArgs {
    /// Validate into the service configuration
    pub fn into_config(self) -> Result<ServiceConfig> {
        let environment = self.environment.or(self.node_env).unwrap_or_default();
        ServiceConfig::new(
            self.port,
            self.database_url,
            RuntimeEnvironment::from_name(&environment),
        )
    }
}
