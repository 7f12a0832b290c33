//! # Diagnostics Routes
//!
//! Health, connectivity and lookup probes used while setting up a deployment.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::auth::Role;
use crate::query_shim::SqlTemplate;

use super::data_routes::redact;
use super::{blocking_response, AppState};

/// Build diagnostics routes
pub fn diagnostics_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(banner))
        .route("/api/health", get(health))
        .route("/test-db", get(test_db))
        .route("/api/test-tables", get(test_tables))
        .route("/api/test-user", get(test_user))
        .with_state(state)
}

async fn banner(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "database": state.database_name,
        "endpoints": [
            "POST /api/auth/login",
            "POST /api/auth/logout",
            "GET /api/auth/verify",
            "GET /api/students",
            "GET /api/teachers",
            "GET /api/grades",
            "GET /api/health",
        ],
    }))
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
        "uptime": state.started_at.elapsed().as_secs_f64(),
    }))
}

async fn test_db(State(state): State<Arc<AppState>>) -> Response {
    blocking_response(&state, check_database).await
}

fn check_database(state: &AppState) -> Response {
    let probe =
        SqlTemplate::literal("SELECT NOW() as current_time, 'Database connected!' as message");

    match state.shim.query(&probe) {
        Ok(rows) => Json(json!({
            "success": true,
            "message": "Database connection successful",
            "data": rows.into_iter().next(),
        }))
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "database probe failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "success": false,
                    "message": "Database connection failed",
                    "error": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}

async fn test_tables(State(state): State<Arc<AppState>>) -> Response {
    blocking_response(&state, count_role_collections).await
}

/// Count every role collection; a failing collection does not fail the rest
fn count_role_collections(state: &AppState) -> Response {
    let mut results = Map::new();

    for role in Role::ALL {
        let template = SqlTemplate::builder()
            .text("SELECT COUNT(*) as count FROM ")
            .value(role.collection())
            .build();

        let entry = match state.shim.query(&template) {
            Ok(rows) => {
                let count = rows
                    .first()
                    .and_then(|row| row.get("count"))
                    .cloned()
                    .unwrap_or(Value::from(0));
                tracing::info!(collection = role.collection(), %count, "collection counted");
                json!({ "status": "success", "count": count })
            }
            Err(e) => {
                tracing::warn!(collection = role.collection(), error = %e, "collection count failed");
                json!({ "status": "error", "error": e.to_string() })
            }
        };
        results.insert(role.collection().to_string(), entry);
    }

    Json(json!({
        "success": true,
        "message": "Collection test completed",
        "results": results,
    }))
    .into_response()
}

#[derive(Debug, Deserialize)]
struct TestUserQuery {
    email: Option<String>,
    role: Option<String>,
}

async fn test_user(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TestUserQuery>,
) -> Response {
    let (Some(email), Some(role)) = (
        params.email.filter(|s| !s.is_empty()),
        params.role.filter(|s| !s.is_empty()),
    ) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "message": "Email and role parameters are required",
            })),
        )
            .into_response();
    };

    blocking_response(&state, move |state| lookup_user(state, &email, &role)).await
}

fn lookup_user(state: &AppState, email: &str, role: &str) -> Response {
    tracing::info!(%email, collection = %role, "user lookup");
    let template = SqlTemplate::builder()
        .text("SELECT * FROM ")
        .value(role)
        .text(" WHERE email = ")
        .value(email)
        .build();

    match state.shim.query(&template) {
        Ok(mut users) => {
            users.iter_mut().for_each(redact);
            Json(json!({
                "success": true,
                "message": format!("User lookup completed for {email} in {role} collection"),
                "found": users.len(),
                "users": users,
            }))
            .into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "success": false,
                "message": "User test failed",
                "error": e.to_string(),
            })),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = diagnostics_routes(test_state())
            .oneshot(request)
            .await
            .unwrap();
        let status = response.status();
        (status, body_json(response).await)
    }

    #[tokio::test]
    async fn test_health() {
        let (status, json) = get_json("/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert!(json["uptime"].as_f64().unwrap() >= 0.0);
        assert!(json["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_banner_names_database() {
        let (status, json) = get_json("/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["database"], "AILMS");
    }

    #[tokio::test]
    async fn test_db_probe() {
        let (status, json) = get_json("/test-db").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["message"], "Database connected!");
    }

    #[tokio::test]
    async fn test_tables_counts_each_role() {
        let (status, json) = get_json("/api/test-tables").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["results"]["admin"]["count"], 2);
        assert_eq!(json["results"]["teacher"]["count"], 2);
        assert_eq!(json["results"]["student"]["count"], 2);
        assert_eq!(json["results"]["staff"]["count"], 1);
    }

    #[tokio::test]
    async fn test_user_lookup_redacts_password() {
        let (status, json) = get_json("/api/test-user?email=alan12@gmail.com&role=student").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["found"], 1);
        assert_eq!(json["users"][0]["name"], "Alan Wilson");
        assert!(json["users"][0].get("password").is_none());
    }

    #[tokio::test]
    async fn test_user_lookup_requires_params() {
        let (status, json) = get_json("/api/test-user?email=alan12@gmail.com").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Email and role parameters are required");
    }
}
