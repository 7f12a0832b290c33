//! CLI errors
//!
//! Every failure a command can hit, folded into one type carrying a stable
//! code and the process exit status that goes with it.

use std::fmt;

use thiserror::Error;

use crate::auth::AuthError;
use crate::client::ClientError;
use crate::config::ConfigError;
use crate::query_shim::ShimError;
use crate::store::StoreError;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorCode {
    Config,
    Store,
    Query,
    AuthFailed,
    Session,
    NotAuthenticated,
    ServerFailed,
}

impl CliErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CliErrorCode::Config => "CONFIG_ERROR",
            CliErrorCode::Store => "STORE_ERROR",
            CliErrorCode::Query => "QUERY_ERROR",
            CliErrorCode::AuthFailed => "AUTH_FAILED",
            CliErrorCode::Session => "SESSION_ERROR",
            CliErrorCode::NotAuthenticated => "NOT_AUTHENTICATED",
            CliErrorCode::ServerFailed => "SERVER_FAILED",
        }
    }

    /// Process exit status
    pub fn exit_code(&self) -> i32 {
        match self {
            CliErrorCode::Config => 2,
            CliErrorCode::AuthFailed | CliErrorCode::NotAuthenticated => 3,
            _ => 1,
        }
    }
}

impl fmt::Display for CliErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("[{code}] {message}")]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(message: impl Into<String>) -> Self {
        Self::new(CliErrorCode::Config, message)
    }

    pub fn server_failed(message: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ServerFailed, message)
    }

    pub fn not_authenticated(message: impl Into<String>) -> Self {
        Self::new(CliErrorCode::NotAuthenticated, message)
    }

    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Store(e) => e.into(),
            other => Self::config_error(other.to_string()),
        }
    }
}

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        Self::new(CliErrorCode::Store, err.to_string())
    }
}

impl From<ShimError> for CliError {
    fn from(err: ShimError) -> Self {
        match err {
            ShimError::Store(e) => e.into(),
            other => Self::new(CliErrorCode::Query, other.to_string()),
        }
    }
}

impl From<AuthError> for CliError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Store(e) => e.into(),
            AuthError::Shim(e) => e.into(),
            other => Self::new(CliErrorCode::AuthFailed, other.to_string()),
        }
    }
}

impl From<ClientError> for CliError {
    fn from(err: ClientError) -> Self {
        Self::new(CliErrorCode::Session, err.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(CliErrorCode::Query, format!("JSON output failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_code() {
        let err = CliError::config_error("port must be set");
        assert_eq!(err.to_string(), "[CONFIG_ERROR] port must be set");
        assert_eq!(err.code().exit_code(), 2);
    }

    #[test]
    fn test_store_failures_unwrap_through_layers() {
        let err: CliError =
            AuthError::Shim(ShimError::Store(StoreError::unavailable("down"))).into();
        assert_eq!(err.code(), &CliErrorCode::Store);

        let err: CliError = AuthError::InvalidCredentials.into();
        assert_eq!(err.code(), &CliErrorCode::AuthFailed);
        assert_eq!(err.message(), "Invalid credentials");
    }
}
