//! Error types for the wardrobe data layer.

use std::path::PathBuf;

use thiserror::Error;

/// Comprehensive error type for all store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database connection or query errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: rusqlite::Error,
    },
    /// Item not found for the given ID
    #[error("Item with ID {id} not found")]
    ItemNotFound { id: i64 },
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// Serialization errors while writing an attributes map
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Runtime plumbing errors (task join, poisoned lock)
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl StoreError {
    /// Creates a database error with additional context.
    pub fn database(message: impl Into<String>, source: rusqlite::Error) -> Self {
        Self::Database {
            message: message.into(),
            source,
        }
    }

    /// Creates an input validation error for a field.
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Specialized extension trait for database-related Results.
pub trait DatabaseResultExt<T> {
    /// Map database errors with a message.
    fn db_context(self, message: &str) -> Result<T>;
}

impl<T> DatabaseResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn db_context(self, message: &str) -> Result<T> {
        self.map_err(|e| StoreError::database(message, e))
    }
}

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
