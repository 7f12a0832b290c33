//! # Query Shim Errors

use serde_json::Value;
use thiserror::Error;

use crate::store::StoreError;

/// Result type for shim operations
pub type ShimResult<T> = Result<T, ShimError>;

/// Query shim error types
#[derive(Debug, Error)]
pub enum ShimError {
    /// No `FROM <value>` clause could be matched
    #[error("No collection specified in query")]
    NoCollection,

    /// The value substituted after `FROM` is not a string
    #[error("Collection name must be a string, got {0}")]
    CollectionNotString(Value),

    /// Format string slots and supplied values disagree
    #[error("Template has {slots} value slots but {values} values were supplied")]
    ArityMismatch { slots: usize, values: usize },

    /// The store rejected the translated call
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ShimError {
    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NoCollection => "SHIM_NO_COLLECTION",
            Self::CollectionNotString(_) => "SHIM_BAD_COLLECTION",
            Self::ArityMismatch { .. } => "SHIM_ARITY_MISMATCH",
            Self::Store(e) => e.error_code(),
        }
    }
}
