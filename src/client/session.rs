//! # Client Session
//!
//! Persists a login result into session storage and reads it back. Nothing
//! here talks to the server: there is no refresh and no server-side
//! invalidation, so a stored session lives until `logout` clears it.

use serde::{Deserialize, Serialize};

use crate::auth::{LoginResponse, UserProfile};

use super::errors::ClientResult;
use super::storage::SessionStorage;

/// Storage key holding the serialized user profile
pub const USER_KEY: &str = "user";
/// Storage key holding the session token
pub const TOKEN_KEY: &str = "token";
/// Storage key holding the `"true"` authentication flag
pub const AUTH_FLAG_KEY: &str = "isAuthenticated";

/// The stored view of a logged-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSession {
    pub user: UserProfile,
    pub token: Option<String>,
}

/// Reads and writes the client session in a storage backend
pub struct SessionManager<S: SessionStorage> {
    storage: S,
}

impl<S: SessionStorage> SessionManager<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Store a successful login
    pub fn persist(&self, response: &LoginResponse) -> ClientResult<()> {
        let user = serde_json::to_string(&response.user)?;
        self.storage.set_item(USER_KEY, &user)?;
        self.storage.set_item(TOKEN_KEY, &response.token)?;
        self.storage.set_item(AUTH_FLAG_KEY, "true")?;
        Ok(())
    }

    /// Current session, if the flag and a parsable user are both present
    pub fn current(&self) -> ClientResult<Option<ClientSession>> {
        let flag = self.storage.get_item(AUTH_FLAG_KEY)?;
        let user = self.storage.get_item(USER_KEY)?;

        let (Some(flag), Some(user)) = (flag, user) else {
            return Ok(None);
        };
        if flag.is_empty() {
            return Ok(None);
        }

        match serde_json::from_str::<UserProfile>(&user) {
            Ok(user) => Ok(Some(ClientSession {
                user,
                token: self.storage.get_item(TOKEN_KEY)?,
            })),
            Err(e) => {
                tracing::warn!(error = %e, "stored user is unreadable");
                Ok(None)
            }
        }
    }

    /// Clear the stored session
    pub fn logout(&self) -> ClientResult<()> {
        self.storage.remove_item(USER_KEY)?;
        self.storage.remove_item(TOKEN_KEY)?;
        self.storage.remove_item(AUTH_FLAG_KEY)?;
        Ok(())
    }
}
