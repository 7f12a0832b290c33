//! # Store Errors
//!
//! Failures raised by credential store backends.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Credential store error types
#[derive(Debug, Error)]
pub enum StoreError {
    /// A lock guarding store state was poisoned by a panicking writer
    #[error("store lock poisoned: {0}")]
    LockPoisoned(&'static str),

    /// Reading or writing the backing file failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Backing data is not in the expected shape
    #[error("malformed store data: {0}")]
    Malformed(String),

    /// Backend cannot be reached
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// MongoDB driver failure
    #[error("MongoDB error: {0}")]
    Driver(#[from] mongodb::error::Error),
}

impl StoreError {
    /// Create a malformed-data error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    /// Create an unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::LockPoisoned(_) => "STORE_LOCK_POISONED",
            Self::Io { .. } => "STORE_IO_ERROR",
            Self::Malformed(_) => "STORE_MALFORMED",
            Self::Unavailable(_) => "STORE_UNAVAILABLE",
            Self::Driver(_) => "STORE_DRIVER_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(StoreError::malformed("x").error_code(), "STORE_MALFORMED");
        assert_eq!(
            StoreError::unavailable("down").error_code(),
            "STORE_UNAVAILABLE"
        );
        assert!(StoreError::unavailable("down").to_string().contains("down"));
    }
}
