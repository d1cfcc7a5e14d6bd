//! Core error types for studykit-core.
//!
//! Nothing in this library is fatal to the process: remote failures are
//! surfaced through [`CoreError::RemoteFetch`] and [`CoreError::RemoteLog`]
//! so callers can degrade to defaults and keep going.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for studykit-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A read from the activity/XP store failed.
    #[error("Remote fetch failed during {operation}: {message}")]
    RemoteFetch { operation: String, message: String },

    /// A best-effort write (session log, XP award) failed.
    #[error("Remote log failed during {operation}: {message}")]
    RemoteLog { operation: String, message: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

impl CoreError {
    pub fn remote_fetch(operation: &str, message: impl ToString) -> Self {
        CoreError::RemoteFetch {
            operation: operation.to_string(),
            message: message.to_string(),
        }
    }

    pub fn remote_log(operation: &str, message: impl ToString) -> Self {
        CoreError::RemoteLog {
            operation: operation.to_string(),
            message: message.to_string(),
        }
    }

    /// True for failures that should degrade to cached/default state.
    pub fn is_remote(&self) -> bool {
        matches!(self, CoreError::RemoteFetch { .. } | CoreError::RemoteLog { .. })
    }
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// XP amount was non-finite, non-numeric, or not positive after flooring.
    #[error("Invalid XP amount: {input}")]
    InvalidAmount { input: String },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// No task with the given id
    #[error("Unknown task: {0}")]
    UnknownTask(String),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_errors_are_flagged() {
        assert!(CoreError::remote_fetch("fetch_xp_stats", "timeout").is_remote());
        assert!(CoreError::remote_log("log_session", "503").is_remote());
        assert!(!CoreError::Custom("x".into()).is_remote());
    }

    #[test]
    fn invalid_amount_message_includes_input() {
        let err = CoreError::from(ValidationError::InvalidAmount {
            input: "NaN".into(),
        });
        assert_eq!(err.to_string(), "Validation error: Invalid XP amount: NaN");
    }
}
