//! # Auth Module
//!
//! Role-based login, password checks and stateless session tokens.

pub mod errors;
pub mod jwt;
pub mod login;
pub mod password;
pub mod role;

pub use errors::{AuthError, AuthResult, ErrorResponse};
pub use jwt::{JwtManager, SessionClaims, DEFAULT_TOKEN_TTL_HOURS};
pub use login::{LoginRequest, LoginResponse, LoginService, UserProfile};
pub use password::{hash_password, is_hashed, verify_password};
pub use role::Role;
