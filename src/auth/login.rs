//! # Login Flow
//!
//! Validate `{email, password, role}`, probe the store, look the record up in
//! the role's collection through the query shim, check the password and sign
//! a session token.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::query_shim::{QueryShim, SqlTemplate};
use crate::store::{Document, ID_FIELD};

use super::errors::{AuthError, AuthResult};
use super::jwt::JwtManager;
use super::password::{coerce_to_string, is_present, verify_password};
use super::role::Role;

/// Login request body
///
/// Fields are loosely typed: clients send passwords as strings or numbers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Value,
    #[serde(default)]
    pub password: Value,
    #[serde(default)]
    pub role: Value,
}

impl LoginRequest {
    pub fn new(email: impl Into<Value>, password: impl Into<Value>, role: impl Into<Value>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            role: role.into(),
        }
    }
}

/// Public view of a credential record (never carries the password)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub role: Role,
    /// Role-specific attribute (subject, class or department)
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl UserProfile {
    /// Build a profile from a stored record
    pub fn from_record(role: Role, record: &Document) -> Self {
        let text = |field: &str| {
            record
                .get(field)
                .filter(|v| !v.is_null())
                .map(coerce_to_string)
        };

        let mut attributes = Map::new();
        if let Some(attr) = role.profile_attribute() {
            if let Some(value) = record.get(attr) {
                attributes.insert(attr.to_string(), value.clone());
            }
        }

        Self {
            id: text(ID_FIELD).unwrap_or_default(),
            email: text("email").unwrap_or_default(),
            name: text("name").or_else(|| text("full_name")),
            role,
            attributes,
        }
    }
}

/// Successful login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user: UserProfile,
}

/// Role-based login against the credential store
#[derive(Clone)]
pub struct LoginService {
    shim: QueryShim,
    jwt: JwtManager,
}

impl LoginService {
    pub fn new(shim: QueryShim, jwt: JwtManager) -> Self {
        Self { shim, jwt }
    }

    pub fn jwt(&self) -> &JwtManager {
        &self.jwt
    }

    /// Authenticate a request and issue a session token
    pub fn login(&self, request: &LoginRequest) -> AuthResult<LoginResponse> {
        if !is_present(&request.email)
            || !is_present(&request.password)
            || !is_present(&request.role)
        {
            tracing::warn!("login rejected: missing required fields");
            return Err(AuthError::MissingFields);
        }

        let role = match &request.role {
            Value::String(s) => s.parse::<Role>()?,
            other => return Err(AuthError::InvalidRole(other.to_string())),
        };
        let email = coerce_to_string(&request.email);
        tracing::info!(%email, %role, "login attempt");

        self.shim
            .query(&SqlTemplate::literal("SELECT 1 as connection_test"))?;

        let Some(record) = self.lookup(role, &request.email)?.into_iter().next() else {
            tracing::warn!(%email, %role, "login failed: no such user");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(record.get("password"), &request.password)? {
            tracing::warn!(%email, %role, "login failed: password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let user = UserProfile::from_record(role, &record);
        let token = self.jwt.issue(&user)?;
        tracing::info!(%email, %role, user_id = %user.id, "login succeeded");

        Ok(LoginResponse {
            success: true,
            message: format!("Login successful - Welcome {}!", role),
            token,
            user,
        })
    }

    /// Find credential records by email in a role's collection
    fn lookup(&self, role: Role, email: &Value) -> AuthResult<Vec<Document>> {
        let mut fields = String::from("_id, email, password, name, full_name");
        if let Some(attr) = role.profile_attribute() {
            fields.push_str(", ");
            fields.push_str(attr);
        }

        let template = SqlTemplate::builder()
            .text(&format!("SELECT {} FROM ", fields))
            .value(role.collection())
            .text(" WHERE email = ")
            .value(email.clone())
            .build();

        Ok(self.shim.query(&template)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password;
    use crate::store::seed::demo_store;
    use crate::store::{
        DocumentStore, Filter, FindOptions, MemoryStore, StoreError, StoreResult,
    };
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Store wrapper counting every call that reaches the backend
    struct CountingStore {
        inner: MemoryStore,
        calls: AtomicUsize,
    }

    impl DocumentStore for CountingStore {
        fn find(&self, c: &str, f: &Filter, o: &FindOptions) -> StoreResult<Vec<Document>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.find(c, f, o)
        }
        fn count(&self, c: &str, f: &Filter) -> StoreResult<u64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.count(c, f)
        }
        fn ping(&self) -> StoreResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.ping()
        }
        fn collection_names(&self) -> StoreResult<Vec<String>> {
            self.inner.collection_names()
        }
    }

    struct FailingStore;

    impl DocumentStore for FailingStore {
        fn find(&self, _: &str, _: &Filter, _: &FindOptions) -> StoreResult<Vec<Document>> {
            Err(StoreError::unavailable("connection reset"))
        }
        fn count(&self, _: &str, _: &Filter) -> StoreResult<u64> {
            Err(StoreError::unavailable("connection reset"))
        }
        fn ping(&self) -> StoreResult<()> {
            Ok(())
        }
        fn collection_names(&self) -> StoreResult<Vec<String>> {
            Ok(vec![])
        }
    }

    fn service_with(store: Arc<dyn DocumentStore>) -> LoginService {
        LoginService::new(QueryShim::new(store), JwtManager::with_default_ttl("test-secret"))
    }

    fn demo_service() -> LoginService {
        service_with(Arc::new(demo_store().unwrap()))
    }

    #[test]
    fn test_login_every_role() {
        let service = demo_service();
        let cases = [
            ("admin@school.com", "admin123", Role::Admin),
            ("teacher1@school.com", "teacher123", Role::Teacher),
            ("student1@school.com", "student123", Role::Student),
            ("staff1@school.com", "staff123", Role::Staff),
        ];

        for (email, password, role) in cases {
            let response = service
                .login(&LoginRequest::new(email, password, role.as_str()))
                .unwrap();
            assert!(response.success);
            assert_eq!(response.user.role, role);
            assert_eq!(service.jwt().verify(&response.token).unwrap().role, role);
        }
    }

    #[test]
    fn test_numeric_password_coercion() {
        let service = demo_service();
        let response = service
            .login(&LoginRequest::new("alan12@gmail.com", "12345678", "student"))
            .unwrap();
        assert_eq!(response.user.id, "student_002");
        assert_eq!(response.user.attributes["class"], json!("11th"));
        assert_eq!(response.message, "Login successful - Welcome student!");

        let result = service.login(&LoginRequest::new("alan12@gmail.com", "1234567", "student"));
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[test]
    fn test_numeric_password_in_request() {
        let service = demo_service();
        assert!(service
            .login(&LoginRequest::new("parve123@gmail.com", 12345678, "admin"))
            .is_ok());
    }

    #[test]
    fn test_wrong_password_for_string_row() {
        let service = demo_service();
        let result = service.login(&LoginRequest::new("teacher1@school.com", "nope", "teacher"));
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[test]
    fn test_unknown_email_is_401() {
        let service = demo_service();
        let err = service
            .login(&LoginRequest::new("ghost@school.com", "x", "student"))
            .unwrap_err();
        assert_eq!(err.status_code(), 401);
    }

    #[test]
    fn test_role_partitions_lookup() {
        let service = demo_service();
        let result = service.login(&LoginRequest::new("admin@school.com", "admin123", "student"));
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[test]
    fn test_missing_fields_skip_store() {
        let store = Arc::new(CountingStore {
            inner: demo_store().unwrap(),
            calls: AtomicUsize::new(0),
        });
        let service = service_with(store.clone());

        let requests = [
            LoginRequest::new(Value::Null, "pw", "admin"),
            LoginRequest::new("a@b.com", "", "admin"),
            LoginRequest::new("a@b.com", "pw", Value::Null),
            LoginRequest::default(),
        ];
        for request in &requests {
            let err = service.login(request).unwrap_err();
            assert!(matches!(err, AuthError::MissingFields));
            assert_eq!(err.status_code(), 400);
        }

        let err = service
            .login(&LoginRequest::new("a@b.com", "pw", "principal"))
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidRole(_)));

        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_store_failure_is_500() {
        let service = service_with(Arc::new(FailingStore));
        let err = service
            .login(&LoginRequest::new("a@b.com", "pw", "admin"))
            .unwrap_err();
        assert_eq!(err.status_code(), 500);
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn test_hashed_row_login() {
        let store = MemoryStore::from_value(json!({
            "staff": [{
                "_id": "staff_009",
                "email": "ops@school.com",
                "password": hash_password("s3cret").unwrap(),
                "full_name": "Ops Person",
                "department": "Facilities"
            }]
        }))
        .unwrap();
        let service = service_with(Arc::new(store));

        let response = service
            .login(&LoginRequest::new("ops@school.com", "s3cret", "staff"))
            .unwrap();
        assert_eq!(response.user.name.as_deref(), Some("Ops Person"));
        assert_eq!(response.user.attributes["department"], json!("Facilities"));

        assert!(service
            .login(&LoginRequest::new("ops@school.com", "S3cret", "staff"))
            .is_err());
    }

    #[test]
    fn test_argon2_prefixed_plaintext_row_login() {
        let store = MemoryStore::from_value(json!({
            "student": [{ "email": "x@y.com", "password": "$argon2rocks" }]
        }))
        .unwrap();
        let service = service_with(Arc::new(store));

        assert!(service
            .login(&LoginRequest::new("x@y.com", "$argon2rocks", "student"))
            .is_ok());
        let result = service.login(&LoginRequest::new("x@y.com", "$argon2", "student"));
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[test]
    fn test_unusable_hash_is_500() {
        let store = MemoryStore::from_value(json!({
            "admin": [{
                "email": "root@school.com",
                "password": "$argon2id$v=19$m=1,t=1,p=1$c29tZXNhbHQ$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA"
            }]
        }))
        .unwrap();
        let err = service_with(Arc::new(store))
            .login(&LoginRequest::new("root@school.com", "pw", "admin"))
            .unwrap_err();
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.error_code(), "HASHING_FAILED");
    }

    #[test]
    fn test_profile_omits_password() {
        let service = demo_service();
        let response = service
            .login(&LoginRequest::new("teacher2@school.com", "teacher456", "teacher"))
            .unwrap();
        let json = serde_json::to_value(&response.user).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["subject"], json!("English"));
        assert_eq!(json["role"], json!("teacher"));
    }
}
