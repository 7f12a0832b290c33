//! # Auth Errors
//!
//! Every failure the login and token flows can produce, with the HTTP status
//! and machine code each one maps to. Authentication failures share one
//! generic message so callers cannot tell an unknown email from a wrong
//! password.

use serde::Serialize;
use thiserror::Error;

use crate::query_shim::ShimError;
use crate::store::StoreError;

/// Result type for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth error types
#[derive(Debug, Error)]
pub enum AuthError {
    /// One of email, password or role is absent or empty
    #[error("Email, password, and role are required")]
    MissingFields,

    /// Role is not one of the known roles
    #[error("Valid role is required (admin, teacher, student, staff)")]
    InvalidRole(String),

    /// Request body could not be parsed
    #[error("Invalid request body: {0}")]
    MalformedRequest(String),

    /// Unknown email or wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No bearer token on a protected call
    #[error("No token provided")]
    MissingToken,

    /// Token failed signature or format checks
    #[error("Invalid token")]
    TokenInvalid(String),

    /// Token is past its expiry
    #[error("Invalid token")]
    TokenExpired,

    /// Token could not be signed
    #[error("Token creation failed: {0}")]
    TokenCreation(String),

    /// Password hashing or hash parsing failed
    #[error("Password hashing failed: {0}")]
    Hashing(String),

    /// Store failure reached directly
    #[error("Database error: {0}")]
    Store(#[from] StoreError),

    /// Store failure reached through the query shim
    #[error("Database error: {0}")]
    Shim(#[from] ShimError),
}

impl AuthError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MissingFields | Self::InvalidRole(_) | Self::MalformedRequest(_) => 400,
            Self::InvalidCredentials
            | Self::MissingToken
            | Self::TokenInvalid(_)
            | Self::TokenExpired => 401,
            Self::TokenCreation(_) | Self::Hashing(_) | Self::Store(_) | Self::Shim(_) => 500,
        }
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingFields => "MISSING_FIELDS",
            Self::InvalidRole(_) => "INVALID_ROLE",
            Self::MalformedRequest(_) => "MALFORMED_REQUEST",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::MissingToken => "MISSING_TOKEN",
            Self::TokenInvalid(_) => "TOKEN_INVALID",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::TokenCreation(_) => "TOKEN_CREATION_FAILED",
            Self::Hashing(_) => "HASHING_FAILED",
            Self::Store(e) => e.error_code(),
            Self::Shim(e) => e.error_code(),
        }
    }
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    pub code: &'static str,
}

impl From<&AuthError> for ErrorResponse {
    fn from(err: &AuthError) -> Self {
        Self {
            success: false,
            message: err.to_string(),
            code: err.error_code(),
        }
    }
}
