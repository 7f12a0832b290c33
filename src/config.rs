//! # Configuration
//!
//! `AppConfig` is assembled in three layers: built-in defaults, an optional
//! `.json` or `.toml` file, then environment variables. The result is checked
//! with [`ConfigValidator`] before anything is opened.
//!
//! Environment variables:
//!
//! | Variable      | Field           |
//! |---------------|-----------------|
//! | `PORT`        | `port`          |
//! | `MONGODB_URI` | `store_uri`     |
//! | `DB_NAME`     | `database_name` |
//! | `JWT_SECRET`  | `jwt_secret`    |
//!
//! `MONGODB_URI` takes a `mongodb://` or `mongodb+srv://` connection string;
//! `memory://` and `file://<path>` select the local development stores.
//!
//! `DB_HOST`, `DB_PORT`, `DB_USER` and `DB_PASSWORD` are read for
//! compatibility with older deployments, reported, and otherwise ignored.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::{JwtManager, DEFAULT_TOKEN_TTL_HOURS};
use crate::config_validator::{format_validation_errors, ConfigValidator};
use crate::http_server::HttpServerConfig;
use crate::store::{is_mongodb_uri, seed, DocumentStore, MemoryStore, MongoStore, StoreError};

/// Secret used when none is configured
pub const DEFAULT_JWT_SECRET: &str = "change-me-in-production";

const MEMORY_SCHEME: &str = "memory://";
const FILE_SCHEME: &str = "file://";
const MAX_TOKEN_TTL_HOURS: i64 = 720;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("unsupported config format {0} (expected .json or .toml)")]
    UnsupportedFormat(PathBuf),

    #[error("invalid environment variable {name}: {message}")]
    Env { name: &'static str, message: String },

    #[error("invalid configuration:\n{0}")]
    Invalid(String),

    #[error("failed to open store: {0}")]
    Store(#[from] StoreError),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub port: u16,
    pub bind_address: String,
    /// MongoDB connection string, `memory://` for the built-in seed, or
    /// `file://<path>` for a JSON store
    pub store_uri: String,
    pub database_name: String,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub log_level: String,
    /// Panic reports are appended here when set
    pub crash_log: Option<PathBuf>,
    #[serde(skip)]
    pub legacy: LegacyDatabaseSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3001,
            bind_address: "0.0.0.0".to_string(),
            store_uri: MEMORY_SCHEME.to_string(),
            database_name: "AILMS".to_string(),
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            token_ttl_hours: DEFAULT_TOKEN_TTL_HOURS,
            log_level: "info".to_string(),
            crash_log: None,
            legacy: LegacyDatabaseSettings::default(),
        }
    }
}

/// Relational connection settings from older deployments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyDatabaseSettings {
    pub host: Option<String>,
    pub port: Option<String>,
    pub user: Option<String>,
    pub password_set: bool,
}

impl LegacyDatabaseSettings {
    fn from_env<F>(get: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            host: get("DB_HOST"),
            port: get("DB_PORT"),
            user: get("DB_USER"),
            password_set: get("DB_PASSWORD").is_some(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.host.is_none() && self.port.is_none() && self.user.is_none() && !self.password_set
    }

    /// Log that these settings have no effect
    pub fn report(&self) {
        if self.is_empty() {
            return;
        }
        tracing::warn!(
            host = ?self.host,
            port = ?self.port,
            user = ?self.user,
            password_set = self.password_set,
            "DB_HOST/DB_PORT/DB_USER/DB_PASSWORD are ignored; set MONGODB_URI instead"
        );
    }
}

impl AppConfig {
    /// Defaults, then `path`, then the process environment, then validation
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        Self::load_with_env(path, |name| std::env::var(name).ok())
    }

    /// Same as [`AppConfig::load`] with an injectable environment
    pub fn load_with_env<F>(path: Option<&Path>, get: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_from(get)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a config file; missing fields take their defaults
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let parse_error = |message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        };

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content).map_err(|e| parse_error(e.to_string())),
            Some("toml") => toml::from_str(&content).map_err(|e| parse_error(e.to_string())),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// Overlay environment variables
    pub fn apply_env_from<F>(&mut self, get: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = get("PORT") {
            self.port = port.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::Env {
                    name: "PORT",
                    message: e.to_string(),
                }
            })?;
        }
        if let Some(uri) = get("MONGODB_URI") {
            self.store_uri = uri;
        }
        if let Some(name) = get("DB_NAME") {
            self.database_name = name;
        }
        if let Some(secret) = get("JWT_SECRET") {
            self.jwt_secret = secret;
        }
        self.legacy = LegacyDatabaseSettings::from_env(&get);
        Ok(())
    }

    /// Check every field, reporting all problems together
    pub fn validate(&self) -> ConfigResult<()> {
        let mut v = ConfigValidator::new();
        v.validate_port("port", self.port)
            .validate_non_empty("bind_address", &self.bind_address)
            .validate_store_uri("store_uri", &self.store_uri)
            .validate_non_empty("database_name", &self.database_name)
            .validate_secret("jwt_secret", &self.jwt_secret)
            .validate_range("token_ttl_hours", self.token_ttl_hours, 1, MAX_TOKEN_TTL_HOURS)
            .validate_non_empty("log_level", &self.log_level);

        v.finish()
            .map_err(|errors| ConfigError::Invalid(format_validation_errors(&errors)))
    }

    /// Warn about settings that are unsafe outside development
    pub fn report_warnings(&self) {
        if self.jwt_secret == DEFAULT_JWT_SECRET {
            tracing::warn!("JWT_SECRET is not set; tokens are signed with the built-in default");
        }
        self.legacy.report();
    }

    pub fn http_server_config(&self) -> HttpServerConfig {
        HttpServerConfig {
            bind_address: self.bind_address.clone(),
            port: self.port,
        }
    }

    pub fn jwt_manager(&self) -> JwtManager {
        JwtManager::new(&self.jwt_secret, chrono::Duration::hours(self.token_ttl_hours))
    }

    /// Path of a `file://` store, if configured
    pub fn store_path(&self) -> Option<PathBuf> {
        self.store_uri.strip_prefix(FILE_SCHEME).map(PathBuf::from)
    }

    /// Open the configured store
    pub fn open_store(&self) -> ConfigResult<Arc<dyn DocumentStore>> {
        if is_mongodb_uri(&self.store_uri) {
            return Ok(Arc::new(MongoStore::connect(
                &self.store_uri,
                &self.database_name,
            )?));
        }
        if let Some(path) = self.store_path() {
            return Ok(Arc::new(MemoryStore::load_json(&path)?));
        }
        if self.store_uri.starts_with(MEMORY_SCHEME) {
            tracing::info!("using built-in demo data set");
            return Ok(Arc::new(seed::demo_store()?));
        }
        Err(ConfigError::Invalid(format!(
            "  - unsupported store URI: {}",
            self.store_uri
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::load_with_env(None, env(&[])).unwrap();
        assert_eq!(config.port, 3001);
        assert_eq!(config.bind_address, "0.0.0.0");
        assert_eq!(config.store_uri, "memory://");
        assert_eq!(config.database_name, "AILMS");
        assert_eq!(config.jwt_secret, DEFAULT_JWT_SECRET);
        assert_eq!(config.token_ttl_hours, 24);
        assert!(config.legacy.is_empty());
    }

    #[test]
    fn test_env_overrides() {
        let config = AppConfig::load_with_env(
            None,
            env(&[
                ("PORT", "8080"),
                ("MONGODB_URI", "file:///tmp/lms.json"),
                ("DB_NAME", "school"),
                ("JWT_SECRET", "s3cret"),
            ]),
        )
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.store_path(), Some(PathBuf::from("/tmp/lms.json")));
        assert_eq!(config.database_name, "school");
        assert_eq!(config.jwt_secret, "s3cret");
    }

    #[test]
    fn test_bad_port_env() {
        let result = AppConfig::load_with_env(None, env(&[("PORT", "eighty")]));
        assert!(matches!(result, Err(ConfigError::Env { name: "PORT", .. })));
    }

    #[test]
    fn test_legacy_settings_are_collected() {
        let config = AppConfig::load_with_env(
            None,
            env(&[("DB_HOST", "localhost"), ("DB_PASSWORD", "hunter2")]),
        )
        .unwrap();
        assert_eq!(config.legacy.host.as_deref(), Some("localhost"));
        assert!(config.legacy.password_set);
        assert_eq!(config.store_uri, "memory://");
    }

    #[test]
    fn test_json_file_then_env() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("schoolgate.json");
        fs::write(&path, r#"{"port": 4000, "database_name": "from-file"}"#).unwrap();

        let config =
            AppConfig::load_with_env(Some(&path), env(&[("DB_NAME", "from-env")])).unwrap();
        assert_eq!(config.port, 4000);
        assert_eq!(config.database_name, "from-env");
        assert_eq!(config.token_ttl_hours, 24);
    }

    #[test]
    fn test_toml_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("schoolgate.toml");
        fs::write(&path, "port = 5000\ntoken_ttl_hours = 12\n").unwrap();

        let config = AppConfig::load_with_env(Some(&path), env(&[])).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.token_ttl_hours, 12);
        assert_eq!(config.jwt_manager().ttl(), chrono::Duration::hours(12));
    }

    #[test]
    fn test_unsupported_extension() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("schoolgate.yaml");
        fs::write(&path, "port: 1").unwrap();
        assert!(matches!(
            AppConfig::from_file(&path),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_validation_collects_all_errors() {
        let config = AppConfig {
            port: 0,
            store_uri: "postgres://localhost".to_string(),
            jwt_secret: String::new(),
            token_ttl_hours: 0,
            ..AppConfig::default()
        };
        match config.validate() {
            Err(ConfigError::Invalid(report)) => assert_eq!(report.lines().count(), 4),
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn test_mongodb_uri_is_accepted() {
        let config = AppConfig::load_with_env(
            None,
            env(&[("MONGODB_URI", "mongodb://localhost:27017"), ("DB_NAME", "school")]),
        )
        .unwrap();
        assert_eq!(config.store_uri, "mongodb://localhost:27017");
        assert_eq!(config.database_name, "school");
        assert!(config.store_path().is_none());
        // the driver connects on first use, so no server is needed here
        assert!(config.open_store().is_ok());

        let srv = AppConfig::load_with_env(
            None,
            env(&[("MONGODB_URI", "mongodb+srv://cluster0.example.net")]),
        );
        assert!(srv.is_ok());
    }

    #[test]
    fn test_open_memory_store() {
        let store = AppConfig::default().open_store().unwrap();
        assert!(store.collection_names().unwrap().contains(&"student".to_string()));
    }

    #[test]
    fn test_open_file_store() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("store.json");
        seed::demo_store().unwrap().save_json(&path).unwrap();

        let config = AppConfig {
            store_uri: format!("file://{}", path.display()),
            ..AppConfig::default()
        };
        let store = config.open_store().unwrap();
        assert_eq!(
            store.count("grade", &crate::store::Filter::all()).unwrap(),
            4
        );
    }
}
