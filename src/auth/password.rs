//! # Password Checks
//!
//! Stored passwords come in three shapes: plaintext strings, plaintext
//! numbers (rows written by tooling that treated the column as an integer),
//! and argon2 PHC strings written by `schoolgate hash-passwords`.
//!
//! Plaintext rows compare by canonical string form, so `12345678` and
//! `"12345678"` are the same password. Hashed rows are verified with argon2.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use serde_json::Value;
use subtle::ConstantTimeEq;

use super::errors::{AuthError, AuthResult};

/// PHC algorithm identifiers produced by argon2
const ARGON2_ALGORITHMS: [&str; 3] = ["argon2i", "argon2d", "argon2id"];

/// Canonical string form of a JSON value
///
/// Numbers print without a trailing `.0` when integral, so a password stored
/// as `12345678.0` still reads `"12345678"`.
pub fn coerce_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                return n.to_string();
            }
            match n.as_f64() {
                Some(f) if f == 0.0 => "0".to_string(),
                Some(f) if f.fract() == 0.0 && f.abs() < 1e21 => format!("{:.0}", f),
                Some(f) => f.to_string(),
                None => n.to_string(),
            }
        }
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Whether a value counts as present in a request
///
/// `null`, `false`, `0` and `""` are all treated as missing.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Parse a complete argon2 PHC string: known algorithm, salt and hash
///
/// Anything else, including plaintext that merely starts with `$argon2`, is
/// not a hash.
fn parse_argon2(stored: &str) -> Option<PasswordHash<'_>> {
    let parsed = PasswordHash::new(stored).ok()?;
    let known = ARGON2_ALGORITHMS.contains(&parsed.algorithm.as_str());
    (known && parsed.salt.is_some() && parsed.hash.is_some()).then_some(parsed)
}

/// Whether a stored password is an argon2 hash
pub fn is_hashed(stored: &Value) -> bool {
    matches!(stored, Value::String(s) if parse_argon2(s).is_some())
}

/// Check a provided password against the stored one
///
/// A record with no password never matches.
pub fn verify_password(stored: Option<&Value>, provided: &Value) -> AuthResult<bool> {
    let Some(stored) = stored.filter(|v| !v.is_null()) else {
        return Ok(false);
    };
    let provided = coerce_to_string(provided);

    if let Some(parsed) = stored.as_str().and_then(parse_argon2) {
        return match Argon2::default().verify_password(provided.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::Hashing(e.to_string())),
        };
    }

    let stored = coerce_to_string(stored);
    Ok(stored.as_bytes().ct_eq(provided.as_bytes()).into())
}

/// Hash a plaintext password with argon2 and a random salt
pub fn hash_password(plain: &str) -> AuthResult<String> {
    let salt = SaltString::generate(&mut rand::rngs::OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::Hashing(e.to_string()))
}
