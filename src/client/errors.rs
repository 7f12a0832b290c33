//! # Client Session Errors

use std::path::PathBuf;

use thiserror::Error;

/// Result type for client session storage
pub type ClientResult<T> = Result<T, ClientError>;

/// Client session storage error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// Reading or writing the session file failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stored data could not be (de)serialized
    #[error("session data is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A lock guarding storage was poisoned
    #[error("session storage lock poisoned")]
    LockPoisoned,
}
