//! Error types for the gateway request path.
//!
//! Every failure a request can hit maps to an HTTP status plus an optional
//! message for the `X-SQLite-Error` response header. Silent declines
//! (disabled scope, unsupported method) are not errors — they are the
//! `Outcome::Declined` variant in [`crate::handler`].

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Failures surfaced to the caller as an HTTP status and error header.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// No `db` parameter and no fixed database file configured.
    #[error("No Database name specified")]
    MissingDatabase,

    /// The resolved database path is not an existing regular file.
    #[error("database file not found: {0}")]
    DatabaseNotFound(PathBuf),

    /// No `q` parameter and no fixed query configured.
    #[error("No query specified")]
    MissingQuery,

    /// POST body arrived with chunked transfer encoding instead of a
    /// known Content-Length.
    #[error("POST body requires a known Content-Length")]
    LengthRequired,

    /// The engine failed to open the database file.
    #[error("{0}")]
    Connection(rusqlite::Error),

    /// The opened file is not a live, queryable SQLite database.
    #[error("{0}")]
    HealthCheck(rusqlite::Error),

    /// The engine reported an error while executing the query text.
    #[error("{0}")]
    Execution(rusqlite::Error),

    /// Writing serialized rows to the response body failed.
    #[error("{0}")]
    Io(#[from] io::Error),
}

impl GatewayError {
    /// HTTP status code this failure maps to.
    pub fn status(&self) -> u16 {
        match self {
            GatewayError::DatabaseNotFound(_) => 404,
            GatewayError::LengthRequired => 411,
            _ => 500,
        }
    }

    /// Message for the error header, if this failure carries one.
    ///
    /// A missing database file answers with the status alone.
    pub fn header_message(&self) -> Option<String> {
        match self {
            GatewayError::DatabaseNotFound(_) => None,
            other => Some(other.to_string()),
        }
    }
}
