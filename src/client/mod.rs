//! # Client Session
//!
//! The browser side of login: session storage, the session manager that
//! writes a login result into it, and the route guard that reads it back.

pub mod errors;
pub mod guard;
pub mod session;
pub mod storage;

pub use errors::{ClientError, ClientResult};
pub use guard::{required_role_for_path, GuardDecision, RedirectReason, RouteGuard, LOGIN_ROUTE};
pub use session::{ClientSession, SessionManager};
pub use storage::{FileSessionStorage, MemorySessionStorage, SessionStorage};
