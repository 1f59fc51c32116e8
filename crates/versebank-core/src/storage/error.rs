//! Storage error handling
//!
//! Typed errors for every persistence operation. Reads signal absence with
//! `Ok(None)`; these variants cover genuine failures.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// An update targeted a row that does not exist
    #[error("no {entity} found with id '{id}'")]
    NotFound { entity: &'static str, id: String },

    /// Unique or foreign-key constraint breach (e.g. duplicate phone number)
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// The database file could not be opened
    #[error("storage unavailable at '{path}': {source}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// The data directory could not be created
    #[error("failed to create data directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A schema migration step did not complete; the old shape is preserved
    #[error("migration {version} ({name}) failed: {message}")]
    Migration {
        version: i32,
        name: &'static str,
        message: String,
    },

    /// A stored timestamp is not valid RFC 3339 text
    #[error("invalid timestamp '{value}': {source}")]
    InvalidTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// Any other SQLite error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Classify a write failure, surfacing constraint breaches as their own
/// variant so callers can tell them from engine faults.
pub(crate) fn classify_write_error(err: rusqlite::Error) -> StorageError {
    match err {
        rusqlite::Error::SqliteFailure(ref code, ref message)
            if code.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            StorageError::Constraint(message.clone().unwrap_or_else(|| code.to_string()))
        }
        other => StorageError::Database(other),
    }
}
