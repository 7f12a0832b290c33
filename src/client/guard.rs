//! # Route Guard
//!
//! Gates role-specific dashboard routes on the stored session. The role is
//! re-read from storage on every check. The token's expiry is not consulted;
//! a stale token is only caught when the server rejects it.

use crate::auth::Role;

use super::errors::ClientResult;
use super::session::{ClientSession, SessionManager};
use super::storage::SessionStorage;

/// Where unauthenticated visitors are sent
pub const LOGIN_ROUTE: &str = "/login";

/// Why a guard redirected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectReason {
    /// No readable session in storage
    NoSession,
    /// Session role differs from the route's role
    RoleMismatch { required: Role, actual: Role },
}

/// Outcome of a guard check
#[derive(Debug, Clone, PartialEq)]
pub enum GuardDecision {
    Allow(ClientSession),
    Redirect {
        to: &'static str,
        reason: RedirectReason,
    },
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allow(_))
    }
}

/// Role required by a dashboard path, e.g. `/dashboard/teacher/attendance`
pub fn required_role_for_path(path: &str) -> Option<Role> {
    let mut segments = path.trim_start_matches('/').split('/');
    if segments.next() != Some("dashboard") {
        return None;
    }
    segments.next().and_then(|s| s.parse().ok())
}

/// Checks stored sessions against route requirements
pub struct RouteGuard<'a, S: SessionStorage> {
    sessions: &'a SessionManager<S>,
}

impl<'a, S: SessionStorage> RouteGuard<'a, S> {
    pub fn new(sessions: &'a SessionManager<S>) -> Self {
        Self { sessions }
    }

    /// Check access for an optional required role
    pub fn check(&self, required: Option<Role>) -> ClientResult<GuardDecision> {
        let Some(session) = self.sessions.current()? else {
            return Ok(GuardDecision::Redirect {
                to: LOGIN_ROUTE,
                reason: RedirectReason::NoSession,
            });
        };

        if let Some(required) = required {
            if session.user.role != required {
                return Ok(GuardDecision::Redirect {
                    to: LOGIN_ROUTE,
                    reason: RedirectReason::RoleMismatch {
                        required,
                        actual: session.user.role,
                    },
                });
            }
        }

        Ok(GuardDecision::Allow(session))
    }

    /// Check access for a path
    pub fn check_path(&self, path: &str) -> ClientResult<GuardDecision> {
        self.check(required_role_for_path(path))
    }
}
