//! Functional tests for the issue API
//!
//! Drives the router end to end: create, list with filters, update, and
//! delete against a temp-dir-backed store, asserting the exact wire
//! contract, including the errors that travel as HTTP 200.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use issuedb::api::{issue_routes, ApiState};
use issuedb::store::IssueStore;

fn test_router(temp: &TempDir) -> Router {
    let store = IssueStore::open(temp.path()).unwrap();
    Router::new().nest("/api", issue_routes(Arc::new(ApiState::new(store))))
}

async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_issue(router: &Router, project: &str, body: Value) -> Value {
    let (status, value) = send(
        router,
        Method::POST,
        &format!("/api/issues/{}", project),
        Some(body),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    value
}

fn required_body() -> Value {
    json!({
        "issue_title": "This is the title",
        "issue_text": "This is the text",
        "created_by": "This is the creator",
    })
}

#[tokio::test]
async fn create_issue_with_every_field() {
    let temp = TempDir::new().unwrap();
    let router = test_router(&temp);

    let body = json!({
        "issue_title": "This is the title",
        "issue_text": "This is the text",
        "created_by": "This is the creator",
        "assigned_to": "This is the assigned",
        "status_text": "This is the status text",
    });
    let issue = create_issue(&router, "apitest", body).await;

    assert_eq!(issue["issue_title"], "This is the title");
    assert_eq!(issue["issue_text"], "This is the text");
    assert_eq!(issue["assigned_to"], "This is the assigned");
    assert_eq!(issue["status_text"], "This is the status text");
    assert_eq!(issue["open"], true);
    assert!(issue["_id"].is_string());
    assert!(issue["created_on"].is_string());
    assert!(issue["updated_on"].is_string());
    assert_eq!(issue["created_on"], issue["updated_on"]);
}

#[tokio::test]
async fn create_issue_with_only_required_fields() {
    let temp = TempDir::new().unwrap();
    let router = test_router(&temp);

    let issue = create_issue(&router, "apitest", required_body()).await;

    assert_eq!(issue["issue_title"], "This is the title");
    assert_eq!(issue["assigned_to"], "");
    assert_eq!(issue["status_text"], "");
    assert_eq!(issue["open"], true);
}

#[tokio::test]
async fn create_issue_with_missing_required_fields() {
    let temp = TempDir::new().unwrap();
    let router = test_router(&temp);

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/issues/apitest",
        Some(json!({"issue_title": "This is the title"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"error": "required field(s) missing"}));

    // Nothing was persisted.
    let (_, issues) = send(&router, Method::GET, "/api/issues/apitest", None).await;
    assert_eq!(issues, json!([]));
}

#[tokio::test]
async fn create_issue_rejects_empty_required_field() {
    let temp = TempDir::new().unwrap();
    let router = test_router(&temp);

    let mut body = required_body();
    body["issue_text"] = json!("");
    let (status, response) =
        send(&router, Method::POST, "/api/issues/apitest", Some(body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["error"], "required field(s) missing");
}

#[tokio::test]
async fn create_ignores_unrecognized_fields() {
    let temp = TempDir::new().unwrap();
    let router = test_router(&temp);

    let mut body = required_body();
    body["open"] = json!(false);
    body["_id"] = json!("client-chosen");
    body["project"] = json!("elsewhere");
    let issue = create_issue(&router, "apitest", body).await;

    // open and _id are not creatable fields; the store decides both.
    assert_eq!(issue["open"], true);
    assert_ne!(issue["_id"], "client-chosen");
    assert!(!issue.as_object().unwrap().contains_key("project"));
}

#[tokio::test]
async fn view_issues_on_a_project() {
    let temp = TempDir::new().unwrap();
    let router = test_router(&temp);

    create_issue(&router, "apitest", required_body()).await;
    create_issue(&router, "apitest", required_body()).await;

    let (status, body) = send(&router, Method::GET, "/api/issues/apitest", None).await;

    assert_eq!(status, StatusCode::OK);
    let issues = body.as_array().unwrap();
    assert_eq!(issues.len(), 2);
    assert!(issues[0]["_id"].is_string());
}

#[tokio::test]
async fn view_issues_with_one_filter() {
    let temp = TempDir::new().unwrap();
    let router = test_router(&temp);

    create_issue(&router, "apitest", required_body()).await;
    let mut other = required_body();
    other["issue_text"] = json!("different text");
    create_issue(&router, "apitest", other).await;

    let (status, body) = send(
        &router,
        Method::GET,
        "/api/issues/apitest?issue_text=different%20text",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let issues = body.as_array().unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0]["issue_text"], "different text");
}

#[tokio::test]
async fn view_issues_with_multiple_filters() {
    let temp = TempDir::new().unwrap();
    let router = test_router(&temp);

    create_issue(&router, "apitest", required_body()).await;
    let mut other = required_body();
    other["created_by"] = json!("someone else");
    create_issue(&router, "apitest", other).await;

    let (_, body) = send(
        &router,
        Method::GET,
        "/api/issues/apitest?issue_title=This%20is%20the%20title&created_by=someone%20else",
        None,
    )
    .await;

    let issues = body.as_array().unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0]["created_by"], "someone else");
}

#[tokio::test]
async fn view_issues_filtered_by_id_round_trips() {
    let temp = TempDir::new().unwrap();
    let router = test_router(&temp);

    let created = create_issue(&router, "apitest", required_body()).await;
    create_issue(&router, "apitest", required_body()).await;
    let id = created["_id"].as_str().unwrap();

    let (status, body) = send(
        &router,
        Method::GET,
        &format!("/api/issues/apitest?_id={}", id),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([created]));
}

#[tokio::test]
async fn view_issues_with_malformed_id_is_a_server_error() {
    let temp = TempDir::new().unwrap();
    let router = test_router(&temp);

    let (status, body) = send(
        &router,
        Method::GET,
        "/api/issues/apitest?_id=not-a-valid-id",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("not-a-valid-id"));
}

#[tokio::test]
async fn view_issues_filtered_by_open_flag() {
    let temp = TempDir::new().unwrap();
    let router = test_router(&temp);

    let created = create_issue(&router, "apitest", required_body()).await;
    create_issue(&router, "apitest", required_body()).await;

    // Close one issue via the string form, which survives projection.
    let id = created["_id"].as_str().unwrap();
    send(
        &router,
        Method::PUT,
        "/api/issues/apitest",
        Some(json!({"_id": id, "open": "false"})),
    )
    .await;

    let (_, closed) = send(&router, Method::GET, "/api/issues/apitest?open=false", None).await;
    let closed = closed.as_array().unwrap();
    assert_eq!(closed.len(), 1);
    assert_eq!(closed[0]["_id"], *id);

    let (_, open) = send(&router, Method::GET, "/api/issues/apitest?open=true", None).await;
    assert_eq!(open.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn projects_are_isolated() {
    let temp = TempDir::new().unwrap();
    let router = test_router(&temp);

    create_issue(&router, "alpha", required_body()).await;

    let (_, beta) = send(&router, Method::GET, "/api/issues/beta", None).await;
    assert_eq!(beta, json!([]));

    let (_, alpha) = send(&router, Method::GET, "/api/issues/alpha", None).await;
    assert_eq!(alpha.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn responses_never_include_project() {
    let temp = TempDir::new().unwrap();
    let router = test_router(&temp);

    let created = create_issue(&router, "apitest", required_body()).await;
    assert!(!created.as_object().unwrap().contains_key("project"));

    let (_, listed) = send(&router, Method::GET, "/api/issues/apitest", None).await;
    assert!(!listed[0].as_object().unwrap().contains_key("project"));
}

#[tokio::test]
async fn update_one_field() {
    let temp = TempDir::new().unwrap();
    let router = test_router(&temp);

    let created = create_issue(&router, "apitest", required_body()).await;
    let id = created["_id"].as_str().unwrap();

    let (status, body) = send(
        &router,
        Method::PUT,
        "/api/issues/apitest",
        Some(json!({"_id": id, "issue_title": "This is the new title"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"result": "successfully updated", "_id": id}));

    let (_, listed) = send(
        &router,
        Method::GET,
        &format!("/api/issues/apitest?_id={}", id),
        None,
    )
    .await;
    let issue = &listed[0];
    assert_eq!(issue["issue_title"], "This is the new title");
    assert_eq!(issue["issue_text"], "This is the text");
    assert!(issue["updated_on"].as_str().unwrap() >= issue["created_on"].as_str().unwrap());
}

#[tokio::test]
async fn update_multiple_fields() {
    let temp = TempDir::new().unwrap();
    let router = test_router(&temp);

    let created = create_issue(&router, "apitest", required_body()).await;
    let id = created["_id"].as_str().unwrap();

    let (status, body) = send(
        &router,
        Method::PUT,
        "/api/issues/apitest",
        Some(json!({
            "_id": id,
            "issue_title": "This is the new title",
            "issue_text": "This is the new text",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "successfully updated");
    assert_eq!(body["_id"], *id);
}

#[tokio::test]
async fn update_with_missing_id() {
    let temp = TempDir::new().unwrap();
    let router = test_router(&temp);

    let (status, body) = send(
        &router,
        Method::PUT,
        "/api/issues/apitest",
        Some(json!({"issue_title": "This is the new title"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"error": "missing _id"}));
}

#[tokio::test]
async fn update_with_no_fields_to_update() {
    let temp = TempDir::new().unwrap();
    let router = test_router(&temp);

    let created = create_issue(&router, "apitest", required_body()).await;
    let id = created["_id"].as_str().unwrap();

    let (status, body) = send(
        &router,
        Method::PUT,
        "/api/issues/apitest",
        Some(json!({"_id": id})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"error": "no update field(s) sent", "_id": id}));
}

#[tokio::test]
async fn update_with_boolean_false_open_is_treated_as_absent() {
    let temp = TempDir::new().unwrap();
    let router = test_router(&temp);

    let created = create_issue(&router, "apitest", required_body()).await;
    let id = created["_id"].as_str().unwrap();

    // A JSON false never survives projection, so the change set is empty.
    let (status, body) = send(
        &router,
        Method::PUT,
        "/api/issues/apitest",
        Some(json!({"_id": id, "open": false})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"], "no update field(s) sent");

    let (_, listed) = send(
        &router,
        Method::GET,
        &format!("/api/issues/apitest?_id={}", id),
        None,
    )
    .await;
    assert_eq!(listed[0]["open"], true);
}

#[tokio::test]
async fn update_with_unknown_id() {
    let temp = TempDir::new().unwrap();
    let router = test_router(&temp);
    let unknown = Uuid::new_v4().to_string();

    let (status, body) = send(
        &router,
        Method::PUT,
        "/api/issues/apitest",
        Some(json!({"_id": unknown, "issue_title": "This is the new title"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"error": "could not update", "_id": unknown}));
}

#[tokio::test]
async fn update_with_malformed_id_mutates_nothing() {
    let temp = TempDir::new().unwrap();
    let router = test_router(&temp);

    let created = create_issue(&router, "apitest", required_body()).await;

    let (status, body) = send(
        &router,
        Method::PUT,
        "/api/issues/apitest",
        Some(json!({"_id": "definitely-not-an-id", "issue_title": "changed"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"error": "could not update", "_id": "definitely-not-an-id"})
    );

    let (_, listed) = send(&router, Method::GET, "/api/issues/apitest", None).await;
    assert_eq!(listed[0]["issue_title"], created["issue_title"]);
}

#[tokio::test]
async fn delete_an_issue() {
    let temp = TempDir::new().unwrap();
    let router = test_router(&temp);

    let created = create_issue(&router, "apitest", required_body()).await;
    let id = created["_id"].as_str().unwrap();

    let (status, body) = send(
        &router,
        Method::DELETE,
        "/api/issues/apitest",
        Some(json!({"_id": id})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"result": "successfully deleted", "_id": id}));

    let (_, listed) = send(&router, Method::GET, "/api/issues/apitest", None).await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn delete_with_unknown_id() {
    let temp = TempDir::new().unwrap();
    let router = test_router(&temp);
    let unknown = Uuid::new_v4().to_string();

    let (status, body) = send(
        &router,
        Method::DELETE,
        "/api/issues/apitest",
        Some(json!({"_id": unknown})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"error": "could not delete", "_id": unknown}));
}

#[tokio::test]
async fn delete_with_missing_id_and_no_body() {
    let temp = TempDir::new().unwrap();
    let router = test_router(&temp);

    let (status, body) = send(&router, Method::DELETE, "/api/issues/apitest", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"error": "missing _id"}));
}

#[tokio::test]
async fn full_lifecycle_on_one_issue() {
    let temp = TempDir::new().unwrap();
    let router = test_router(&temp);

    let created = create_issue(
        &router,
        "apitest",
        json!({"issue_title": "T", "issue_text": "X", "created_by": "C"}),
    )
    .await;
    assert_eq!(created["issue_title"], "T");
    assert_eq!(created["open"], true);
    let id = created["_id"].as_str().unwrap().to_string();

    let (_, listed) = send(&router, Method::GET, "/api/issues/apitest?issue_text=X", None).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["_id"], id);

    let (_, updated) = send(
        &router,
        Method::PUT,
        "/api/issues/apitest",
        Some(json!({"_id": id, "issue_title": "T2"})),
    )
    .await;
    assert_eq!(updated, json!({"result": "successfully updated", "_id": id}));

    let (_, deleted) = send(
        &router,
        Method::DELETE,
        "/api/issues/apitest",
        Some(json!({"_id": id})),
    )
    .await;
    assert_eq!(deleted, json!({"result": "successfully deleted", "_id": id}));
}
