//! # Auth Routes
//!
//! Login, logout and token verification.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use crate::auth::{AuthError, ErrorResponse, LoginRequest};

use super::{blocking_response, AppState};

/// Build auth routes
pub fn auth_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/verify", get(verify))
        .with_state(state)
}

async fn login(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            return error_response(AuthError::MalformedRequest(rejection.body_text()));
        }
    };

    blocking_response(&state, move |state| match state.login.login(&request) {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => error_response(e),
    })
    .await
}

/// Stateless: the client discards its token
async fn logout() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({ "success": true, "message": "Logged out successfully" })),
    )
}

async fn verify(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let Some(token) = bearer_token(&headers) else {
        return error_response(AuthError::MissingToken);
    };

    match state.jwt().verify(token) {
        Ok(claims) => (
            StatusCode::OK,
            Json(json!({ "success": true, "user": claims })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// Second space-separated part of the Authorization header
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .split(' ')
        .nth(1)
        .filter(|token| !token.is_empty())
}

/// Convert error to HTTP response
pub(super) fn error_response(err: AuthError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        tracing::error!(error = %err, code = err.error_code(), "request failed");
    } else {
        tracing::debug!(error = ?err, code = err.error_code(), "request rejected");
    }

    (status, Json(ErrorResponse::from(&err))).into_response()
}
