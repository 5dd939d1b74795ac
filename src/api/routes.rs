//! # Issue Routes
//!
//! The four request handlers under `/issues/:project`, mapping HTTP verbs to
//! store operations. Each handler whitelists the raw input down to its
//! recognized fields before touching the store; validation failures never
//! reach it.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{Map, Value};

use super::errors::{ApiError, ApiResult};
use super::response::{DeleteAck, UpdateAck};
use crate::issue::{
    is_present, project_present, Issue, IssueChanges, IssueDraft, IssueQuery, CREATE_FIELDS,
    UPDATE_FIELDS,
};
use crate::observability::Logger;
use crate::store::IssueStore;

/// Fields that must be supplied, non-empty, to create an issue.
const REQUIRED_FIELDS: &[&str] = &["issue_title", "issue_text", "created_by"];

/// Shared state behind the issue routes.
pub struct ApiState {
    pub store: RwLock<IssueStore>,
}

impl ApiState {
    pub fn new(store: IssueStore) -> Self {
        Self {
            store: RwLock::new(store),
        }
    }
}

/// Builds the issue router. Mount under `/api`.
pub fn issue_routes(state: Arc<ApiState>) -> Router {
    Router::new()
        .route(
            "/issues/:project",
            get(list_issues)
                .post(create_issue)
                .put(update_issue)
                .delete(delete_issue),
        )
        .with_state(state)
}

/// GET: list the project's issues matching the query parameters.
async fn list_issues(
    State(state): State<Arc<ApiState>>,
    Path(project): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Vec<Issue>>> {
    let query = IssueQuery::from_params(&params);

    let store = state
        .store
        .read()
        .map_err(|_| ApiError::Internal("lock poisoned".to_string()))?;
    let issues = store.find(&project, &query)?;

    Ok(Json(issues))
}

/// POST: create an issue in the project.
async fn create_issue(
    State(state): State<Arc<ApiState>>,
    Path(project): Path<String>,
    body: Option<Json<Value>>,
) -> ApiResult<Json<Issue>> {
    let fields = body_fields(body);
    if !has_required_fields(&fields) {
        return Err(ApiError::RequiredFieldsMissing);
    }

    let draft = IssueDraft::from_fields(&project_present(&fields, CREATE_FIELDS));

    let mut store = state
        .store
        .write()
        .map_err(|_| ApiError::Internal("lock poisoned".to_string()))?;
    let issue = store.insert(&project, draft, Utc::now())?;

    let id = issue.id.to_string();
    Logger::info(
        "ISSUE_CREATED",
        &[("id", id.as_str()), ("project", project.as_str())],
    );
    Ok(Json(issue))
}

/// PUT: apply a change set to the issue named by `_id`.
async fn update_issue(
    State(state): State<Arc<ApiState>>,
    Path(_project): Path<String>,
    body: Option<Json<Value>>,
) -> ApiResult<Json<UpdateAck>> {
    let fields = body_fields(body);
    let id = id_field(&fields).ok_or(ApiError::MissingId)?;

    let changes = IssueChanges::from_fields(&project_present(&fields, UPDATE_FIELDS));
    if changes.is_empty() {
        return Err(ApiError::NoUpdateFields { id });
    }

    let mut store = match state.store.write() {
        Ok(store) => store,
        Err(_) => return Err(ApiError::CouldNotUpdate { id }),
    };
    match store.update(&id, &changes, Utc::now()) {
        Ok(_) => {
            Logger::info("ISSUE_UPDATED", &[("id", id.as_str())]);
            Ok(Json(UpdateAck::new(id)))
        }
        Err(err) => {
            let reason = err.to_string();
            Logger::warn(
                "ISSUE_UPDATE_FAILED",
                &[("id", id.as_str()), ("reason", reason.as_str())],
            );
            Err(ApiError::CouldNotUpdate { id })
        }
    }
}

/// DELETE: permanently remove the issue named by `_id`.
async fn delete_issue(
    State(state): State<Arc<ApiState>>,
    Path(_project): Path<String>,
    body: Option<Json<Value>>,
) -> ApiResult<Json<DeleteAck>> {
    let fields = body_fields(body);
    let id = id_field(&fields).ok_or(ApiError::MissingId)?;

    let mut store = match state.store.write() {
        Ok(store) => store,
        Err(_) => return Err(ApiError::CouldNotDelete { id }),
    };
    match store.delete(&id) {
        Ok(()) => {
            Logger::info("ISSUE_DELETED", &[("id", id.as_str())]);
            Ok(Json(DeleteAck::new(id)))
        }
        Err(err) => {
            let reason = err.to_string();
            Logger::warn(
                "ISSUE_DELETE_FAILED",
                &[("id", id.as_str()), ("reason", reason.as_str())],
            );
            Err(ApiError::CouldNotDelete { id })
        }
    }
}

/// Body fields as a map. A missing or non-object body is an empty map, so
/// presence validation produces the contract errors instead of a 4xx.
fn body_fields(body: Option<Json<Value>>) -> Map<String, Value> {
    match body {
        Some(Json(Value::Object(map))) => map,
        _ => Map::new(),
    }
}

/// The `_id` a mutation targets, if one was supplied.
///
/// Non-string values are carried through as text; a malformed identifier is
/// the store's error to report, not a missing one.
fn id_field(fields: &Map<String, Value>) -> Option<String> {
    let value = fields.get("_id").filter(|v| is_present(v))?;
    match value {
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn has_required_fields(fields: &Map<String, Value>) -> bool {
    REQUIRED_FIELDS.iter().all(|&key| {
        fields
            .get(key)
            .and_then(Value::as_str)
            .is_some_and(|s| !s.is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_router_builds() {
        let temp = TempDir::new().unwrap();
        let store = IssueStore::open(temp.path()).unwrap();
        let _router = issue_routes(Arc::new(ApiState::new(store)));
    }

    #[test]
    fn test_required_fields_check() {
        let full = body_fields(Some(Json(json!({
            "issue_title": "T", "issue_text": "X", "created_by": "C"
        }))));
        assert!(has_required_fields(&full));

        let partial = body_fields(Some(Json(json!({"issue_title": "T"}))));
        assert!(!has_required_fields(&partial));

        let empty_value = body_fields(Some(Json(json!({
            "issue_title": "T", "issue_text": "", "created_by": "C"
        }))));
        assert!(!has_required_fields(&empty_value));
    }

    #[test]
    fn test_body_fields_tolerates_missing_body() {
        assert!(body_fields(None).is_empty());
        assert!(body_fields(Some(Json(json!("not an object")))).is_empty());
    }

    #[test]
    fn test_id_field_extraction() {
        let fields = body_fields(Some(Json(json!({"_id": "abc"}))));
        assert_eq!(id_field(&fields), Some("abc".to_string()));

        let absent = body_fields(Some(Json(json!({"_id": ""}))));
        assert_eq!(id_field(&absent), None);

        assert_eq!(id_field(&Map::new()), None);
    }
}
