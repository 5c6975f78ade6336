//! Common error types for Songbook

use thiserror::Error;

/// Common result type for Songbook operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across Songbook components
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Unique constraint violated at the storage layer
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Message that is safe to hand back to a client.
    ///
    /// Only application-raised errors keep their text; storage, config and
    /// internal failures collapse to a generic message.
    pub fn public_message(&self) -> String {
        match self {
            Error::NotFound(msg)
            | Error::InvalidInput(msg)
            | Error::Conflict(msg) => msg.clone(),
            _ => "Internal Server Error".to_string(),
        }
    }
}
