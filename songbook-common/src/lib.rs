//! # Songbook Common Library
//!
//! Shared code for the Songbook services:
//! - Error taxonomy shared by the store, the aggregator and the HTTP layer
//! - Runtime configuration types
//! - Database initialization and song record models

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
