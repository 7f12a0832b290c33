//! # Session Tokens
//!
//! HS256-signed JWTs carrying the logged-in identity. Tokens are stateless:
//! there is no server-side session table and no revocation list, so a token
//! stays valid until `exp`.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::errors::{AuthError, AuthResult};
use super::login::UserProfile;
use super::role::Role;

/// Default token lifetime
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Claims embedded in every session token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Record `_id` in the role's collection
    pub id: String,
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Issued-at (Unix seconds)
    pub iat: i64,
    /// Expiry (Unix seconds)
    pub exp: i64,
}

/// Issues and verifies session tokens
#[derive(Clone)]
pub struct JwtManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl JwtManager {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    /// Manager with the default 24h lifetime
    pub fn with_default_ttl(secret: &str) -> Self {
        Self::new(secret, Duration::hours(DEFAULT_TOKEN_TTL_HOURS))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a token for a user, issued now
    pub fn issue(&self, user: &UserProfile) -> AuthResult<String> {
        self.issue_at(user, Utc::now())
    }

    /// Sign a token for a user with an explicit issue time
    pub fn issue_at(&self, user: &UserProfile, issued_at: DateTime<Utc>) -> AuthResult<String> {
        let claims = SessionClaims {
            id: user.id.clone(),
            email: user.email.clone(),
            role: user.role,
            name: user.name.clone(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::TokenCreation(e.to_string()))
    }

    /// Check signature and expiry, returning the claims
    pub fn verify(&self, token: &str) -> AuthResult<SessionClaims> {
        decode::<SessionClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::TokenInvalid(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(role: Role) -> UserProfile {
        UserProfile {
            id: "student_002".to_string(),
            email: "alan12@gmail.com".to_string(),
            name: Some("Alan Wilson".to_string()),
            role,
            attributes: Default::default(),
        }
    }

    #[test]
    fn test_issue_and_verify() {
        let jwt = JwtManager::with_default_ttl("secret");
        let token = jwt.issue(&profile(Role::Student)).unwrap();

        let claims = jwt.verify(&token).unwrap();
        assert_eq!(claims.role, Role::Student);
        assert_eq!(claims.email, "alan12@gmail.com");
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn test_expired_token_rejected() {
        let jwt = JwtManager::with_default_ttl("secret");
        let issued = Utc::now() - Duration::hours(25);
        let token = jwt.issue_at(&profile(Role::Admin), issued).unwrap();

        assert!(matches!(jwt.verify(&token), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = JwtManager::with_default_ttl("secret")
            .issue(&profile(Role::Teacher))
            .unwrap();
        let other = JwtManager::with_default_ttl("another-secret");

        assert!(matches!(other.verify(&token), Err(AuthError::TokenInvalid(_))));
    }

    #[test]
    fn test_garbage_rejected() {
        let jwt = JwtManager::with_default_ttl("secret");
        assert!(matches!(jwt.verify("not.a.jwt"), Err(AuthError::TokenInvalid(_))));
    }
}
