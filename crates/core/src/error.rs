//! Error types for forumdb
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Most read paths never surface these errors: a missing or undecodable record
//! degrades to `None` / an empty page. Errors are returned from write paths
//! and from opening the store.

use std::io;
use thiserror::Error;

/// Result type alias for forumdb operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for forumdb
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (file operations, backup copies, config files)
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// The underlying ordered store rejected an operation
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Caller supplied a value that cannot be stored (e.g. a username with a separator)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration file could not be read or parsed
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl Error {
    /// Build a storage error from any displayable engine error.
    pub fn storage(err: impl std::fmt::Display) -> Self {
        Error::StorageError(err.to_string())
    }

    /// Build an invalid-input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::SerializationError(e.to_string())
    }
}
