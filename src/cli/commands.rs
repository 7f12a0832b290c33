//! CLI command implementations
//!
//! Commands that touch the store load [`AppConfig`] first, so they see the
//! same store the server would.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};

use crate::auth::{
    hash_password, is_hashed, password::coerce_to_string, LoginRequest, LoginService, Role,
};
use crate::client::{FileSessionStorage, GuardDecision, RedirectReason, RouteGuard, SessionManager};
use crate::config::AppConfig;
use crate::http_server::{AppState, HttpServer};
use crate::logging::init_tracing;
use crate::panic_handler::init_panic_handler;
use crate::query_shim::{QueryShim, SqlTemplate};
use crate::store::{seed, Document, DocumentStore, MemoryStore, StoreError};

use super::args::Command;
use super::errors::{CliError, CliResult};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config, port } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(port) = port {
                config.port = port;
                config.validate()?;
            }
            serve(config)
        }
        Command::Seed { output } => {
            init_tracing("info");
            seed_store(&output)
        }
        Command::HashPasswords { input, output } => {
            init_tracing("info");
            hash_passwords(&input, output.as_deref().unwrap_or(&input))
        }
        Command::CheckUser {
            config,
            email,
            role,
        } => check_user(&load_config(config.as_deref())?, &email, &role),
        Command::Query {
            config,
            template,
            values,
        } => query(&load_config(config.as_deref())?, &template, &values),
        Command::Login {
            config,
            email,
            password,
            role,
            session_dir,
        } => login(
            &load_config(config.as_deref())?,
            &email,
            &password,
            &role,
            &session_dir,
        ),
        Command::Whoami { role, session_dir } => {
            init_tracing("warn");
            whoami(role.as_deref(), &session_dir)
        }
        Command::Logout { session_dir } => {
            init_tracing("warn");
            logout(&session_dir)
        }
    }
}

/// Load config and install logging and the panic hook it asks for
fn load_config(path: Option<&Path>) -> CliResult<AppConfig> {
    let config = AppConfig::load(path)?;
    init_tracing(&config.log_level);
    init_panic_handler(config.crash_log.clone());
    config.report_warnings();
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_role(role: &str) -> CliResult<Role> {
    Ok(role.parse::<Role>()?)
}

/// Start the HTTP server and block until shutdown
pub fn serve(config: AppConfig) -> CliResult<()> {
    let store = config.open_store()?;
    let state = AppState::new(
        QueryShim::new(store),
        config.jwt_manager(),
        config.database_name.clone(),
    );
    let server = HttpServer::new(config.http_server_config(), state);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::server_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::server_failed(format!("HTTP server failed: {}", e)))
    })
}

/// Write the demo data set
pub fn seed_store(output: &Path) -> CliResult<()> {
    let store = seed::demo_store()?;
    store.save_json(output)?;

    let mut counts = serde_json::Map::new();
    for name in store.collection_names()? {
        let count = store.count(&name, &Default::default())?;
        counts.insert(name, json!(count));
    }
    tracing::info!(path = %output.display(), "demo data written");
    print_json(&json!({ "output": output.display().to_string(), "collections": counts }))
}

/// Replace plaintext passwords in role collections with argon2 hashes
pub fn hash_passwords(input: &Path, output: &Path) -> CliResult<()> {
    let store = MemoryStore::load_json(input)?;

    let changed = store.update_each(|collection, doc| {
        if !Role::ALL.iter().any(|r| r.collection() == collection) {
            return Ok(false);
        }
        let Some(stored) = doc.get("password").filter(|v| !v.is_null()) else {
            return Ok(false);
        };
        if is_hashed(stored) {
            return Ok(false);
        }

        let hashed = hash_password(&coerce_to_string(stored))
            .map_err(|e| StoreError::malformed(e.to_string()))?;
        doc.insert("password".to_string(), Value::String(hashed));
        Ok(true)
    })?;

    store.save_json(output)?;
    tracing::info!(changed, path = %output.display(), "passwords hashed");
    print_json(&json!({ "hashed": changed, "output": output.display().to_string() }))
}

fn lookup_template(role: Role, email: &str) -> SqlTemplate {
    SqlTemplate::builder()
        .text("SELECT * FROM ")
        .value(role.collection())
        .text(" WHERE email = ")
        .value(email)
        .build()
}

fn open_shim(config: &AppConfig) -> CliResult<QueryShim> {
    let store: Arc<dyn DocumentStore> = config.open_store()?;
    Ok(QueryShim::new(store))
}

/// Look a user up and print the record without its password
pub fn check_user(config: &AppConfig, email: &str, role: &str) -> CliResult<()> {
    let role = parse_role(role)?;
    let mut users = open_shim(config)?.query(&lookup_template(role, email))?;
    users.iter_mut().for_each(|u: &mut Document| {
        u.remove("password");
    });

    print_json(&json!({
        "email": email,
        "collection": role.collection(),
        "found": users.len(),
        "users": users,
    }))
}

/// Read a `--value` argument as JSON, falling back to text
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Run a template through the shim and print the rows
pub fn query(config: &AppConfig, template: &str, values: &[String]) -> CliResult<()> {
    let values = values.iter().map(|v| parse_value(v)).collect();
    let template = SqlTemplate::from_format(template, values)?;
    let rows = open_shim(config)?.query(&template)?;
    print_json(&rows)
}

/// Log in against the configured store and persist the session
pub fn login(
    config: &AppConfig,
    email: &str,
    password: &str,
    role: &str,
    session_dir: &Path,
) -> CliResult<()> {
    let service = LoginService::new(open_shim(config)?, config.jwt_manager());
    let response = service.login(&LoginRequest::new(email, password, role))?;

    let sessions = SessionManager::new(FileSessionStorage::new(session_dir));
    sessions.persist(&response)?;
    tracing::info!(path = %sessions.storage().path().display(), "session saved");

    print_json(&json!({ "message": response.message, "user": response.user }))
}

/// Run the route guard against the persisted session
pub fn whoami(role: Option<&str>, session_dir: &Path) -> CliResult<()> {
    let required = role.map(parse_role).transpose()?;
    let sessions = SessionManager::new(FileSessionStorage::new(session_dir));

    match RouteGuard::new(&sessions).check(required)? {
        GuardDecision::Allow(session) => print_json(&session.user),
        GuardDecision::Redirect { to, reason } => {
            let why = match reason {
                RedirectReason::NoSession => "no stored session".to_string(),
                RedirectReason::RoleMismatch { required, actual } => {
                    format!("route needs {required}, session is {actual}")
                }
            };
            Err(CliError::not_authenticated(format!("{why}; redirect to {to}")))
        }
    }
}

/// Clear the persisted session
pub fn logout(session_dir: &Path) -> CliResult<()> {
    SessionManager::new(FileSessionStorage::new(session_dir)).logout()?;
    print_json(&json!({ "success": true, "message": "Logged out successfully" }))
}
