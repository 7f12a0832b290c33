//! # HTTP Server
//!
//! axum server exposing login, token verification, the read-only data dumps
//! and a handful of diagnostic routes. All handlers share one [`AppState`].

mod auth_routes;
mod data_routes;
mod diagnostics_routes;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{JwtManager, LoginService};
use crate::query_shim::QueryShim;

pub use auth_routes::auth_routes;
pub use data_routes::data_routes;
pub use diagnostics_routes::diagnostics_routes;

/// Server bind settings
#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    pub bind_address: String,
    pub port: u16,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 3001,
        }
    }
}

/// State shared by every route
pub struct AppState {
    pub shim: QueryShim,
    pub login: LoginService,
    pub database_name: String,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(shim: QueryShim, jwt: JwtManager, database_name: impl Into<String>) -> Self {
        Self {
            login: LoginService::new(shim.clone(), jwt),
            shim,
            database_name: database_name.into(),
            started_at: Instant::now(),
        }
    }

    pub fn jwt(&self) -> &JwtManager {
        self.login.jwt()
    }
}

/// Run a store-bound handler body on the blocking pool
///
/// Store backends and argon2 block the calling thread, so handlers never run
/// them on an async worker.
pub(crate) async fn blocking_response<F>(state: &Arc<AppState>, f: F) -> Response
where
    F: FnOnce(&AppState) -> Response + Send + 'static,
{
    let state = state.clone();
    match tokio::task::spawn_blocking(move || f(&state)).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(error = %e, "request task failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "message": "Internal server error" })),
            )
                .into_response()
        }
    }
}

/// Full application router
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(auth_routes(state.clone()))
        .merge(data_routes(state.clone()))
        .merge(diagnostics_routes(state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// HTTP server
pub struct HttpServer {
    config: HttpServerConfig,
    state: Arc<AppState>,
}

impl HttpServer {
    pub fn new(config: HttpServerConfig, state: AppState) -> Self {
        Self {
            config,
            state: Arc::new(state),
        }
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// Bind and serve until Ctrl-C
    pub async fn start(&self) -> std::io::Result<()> {
        let addr = format!("{}:{}", self.config.bind_address, self.config.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        let local: SocketAddr = listener.local_addr()?;

        tracing::info!(
            address = %local,
            database = %self.state.database_name,
            "server listening"
        );
        tracing::info!("endpoints: POST /api/auth/login, POST /api/auth/logout, GET /api/auth/verify");
        tracing::info!("endpoints: GET /api/students, GET /api/teachers, GET /api/grades");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown signal received");
}
