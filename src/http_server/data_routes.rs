//! # Data Routes
//!
//! Unauthenticated full-collection dumps. Rows go through the query shim and
//! have their password field stripped before leaving the server.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

use crate::query_shim::{ShimError, SqlTemplate};
use crate::store::Document;

use super::{blocking_response, AppState};

/// Field removed from every dumped row
const REDACTED_FIELD: &str = "password";

/// Build data routes
pub fn data_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/students", get(students))
        .route("/api/teachers", get(teachers))
        .route("/api/grades", get(grades))
        .with_state(state)
}

async fn students(State(state): State<Arc<AppState>>) -> Response {
    blocking_response(&state, |state| dump(state, "student", "_id", "students")).await
}

async fn teachers(State(state): State<Arc<AppState>>) -> Response {
    blocking_response(&state, |state| dump(state, "teacher", "_id", "teachers")).await
}

async fn grades(State(state): State<Arc<AppState>>) -> Response {
    blocking_response(&state, |state| dump(state, "grade", "id", "grades")).await
}

fn dump(state: &AppState, collection: &str, sort_field: &str, label: &str) -> Response {
    match fetch_all(state, collection, sort_field) {
        Ok(rows) => {
            tracing::info!(collection, count = rows.len(), "fetched collection");
            let count = rows.len();
            (
                StatusCode::OK,
                Json(json!({
                    "success": true,
                    "message": format!("Successfully fetched {count} {label}"),
                    "data": rows,
                    "count": count,
                })),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(collection, error = %e, "fetch failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "success": false,
                    "message": format!("Failed to fetch {label}: {e}"),
                    "error": e.error_code(),
                })),
            )
                .into_response()
        }
    }
}

fn fetch_all(
    state: &AppState,
    collection: &str,
    sort_field: &str,
) -> Result<Vec<Document>, ShimError> {
    let template = SqlTemplate::builder()
        .text("SELECT * FROM ")
        .value(collection)
        .text(&format!(" ORDER BY {sort_field}"))
        .build();

    let mut rows = state.shim.query(&template)?;
    rows.iter_mut().for_each(redact);
    Ok(rows)
}

/// Strip the password from a row
pub(super) fn redact(row: &mut Document) {
    row.remove(REDACTED_FIELD);
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::auth::JwtManager;
    use crate::query_shim::QueryShim;
    use crate::store::{DocumentStore, Filter, FindOptions, StoreError, StoreResult};
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    async fn get_json(state: Arc<AppState>, uri: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = data_routes(state).oneshot(request).await.unwrap();
        let status = response.status();
        (status, body_json(response).await)
    }

    #[tokio::test]
    async fn test_students_dump() {
        let (status, json) = get_json(test_state(), "/api/students").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["count"], 2);
        assert_eq!(json["message"], "Successfully fetched 2 students");
        assert_eq!(json["data"][0]["_id"], "student_001");
        assert_eq!(json["data"][1]["_id"], "student_002");
        for row in json["data"].as_array().unwrap() {
            assert!(row.get("password").is_none());
        }
    }

    #[tokio::test]
    async fn test_teachers_dump() {
        let (status, json) = get_json(test_state(), "/api/teachers").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["count"], 2);
        assert_eq!(json["data"][0]["subject"], "Mathematics");
    }

    #[tokio::test]
    async fn test_grades_sorted_by_id() {
        let (status, json) = get_json(test_state(), "/api/grades").await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<i64> = json["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|row| row["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    struct DownStore;

    impl DocumentStore for DownStore {
        fn find(&self, _: &str, _: &Filter, _: &FindOptions) -> StoreResult<Vec<Document>> {
            Err(StoreError::unavailable("connection refused"))
        }
        fn count(&self, _: &str, _: &Filter) -> StoreResult<u64> {
            Err(StoreError::unavailable("connection refused"))
        }
        fn ping(&self) -> StoreResult<()> {
            Err(StoreError::unavailable("connection refused"))
        }
        fn collection_names(&self) -> StoreResult<Vec<String>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_store_failure_is_500() {
        let state = Arc::new(AppState::new(
            QueryShim::new(Arc::new(DownStore)),
            JwtManager::with_default_ttl(TEST_SECRET),
            "AILMS",
        ));
        let (status, json) = get_json(state, "/api/grades").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["success"], false);
        assert!(json["message"]
            .as_str()
            .unwrap()
            .starts_with("Failed to fetch grades:"));
    }
}
