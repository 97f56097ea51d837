//! Integration tests for the REST API.
//!
//! These tests drive the full router with an in-process scripted model:
//! - workflow start / status polling / cancellation
//! - the sample-ticket fallback when Jira is unconfigured
//! - the synchronous analyze endpoint
//! - health and metrics exposition
//!
//! No network access is required: Jira stays in sample mode and the model is
//! scripted.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use triager::api::{CompletionModel, ProviderError};
use triager::config::Config;
use triager::rest::{build_router, ApiState};

// ─── Scripted model ───────────────────────────────────────────────────────────

const STORY_TEXT: &str = "\
As a user, I want to reset my password without friction
The reset flow should deliver the email within seconds so users are not
locked out of their accounts.
Acceptance criteria:
- Reset email arrives within one minute
- Link works on first click
- Expired links show a clear error";

const PM_TEXT: &str =
    "Thank you for reporting this! We understand how frustrating a broken reset flow is, \
     and we are prioritizing a fix for the next release.";

/// Deterministic stand-in for the completion model
struct ScriptedModel {
    fail: bool,
}

#[async_trait]
impl CompletionModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn complete(&self, system: &str, _user: &str) -> Result<String, ProviderError> {
        if self.fail {
            return Err(ProviderError::network("scripted", "connection refused"));
        }
        if system.contains("user story") {
            Ok(STORY_TEXT.to_string())
        } else {
            Ok(PM_TEXT.to_string())
        }
    }
}

// ─── Test harness ─────────────────────────────────────────────────────────────

fn test_app() -> Router {
    test_app_with_model(false)
}

fn test_app_with_model(fail: bool) -> Router {
    // Default config: no Jira token (sample mode), zero pacing
    let state = ApiState::with_model(Config::default(), Arc::new(ScriptedModel { fail }));
    build_router(state)
}

async fn send_json(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(json_body) => Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(json_body.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Poll a workflow's status until it completes
async fn poll_until_complete(app: &Router, workflow_id: &str) -> Value {
    for _ in 0..200 {
        let (status, body) =
            send_json(app, "GET", &format!("/workflow/{workflow_id}/status"), None).await;
        assert_eq!(status, StatusCode::OK);
        if body["is_complete"].as_bool() == Some(true) {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("workflow {workflow_id} did not complete in time");
}

// ─── Health and metrics ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_health() {
    let app = test_app();
    let (status, body) = send_json(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_metrics_exposition() {
    let app = test_app();

    let request = Request::builder()
        .method("GET")
        .uri("/metrics")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();

    assert!(text.contains("# TYPE triager_tickets_processed_total counter"));
    assert!(text.contains("# TYPE triager_run_duration_seconds histogram"));
    assert!(text.contains("triager_run_duration_seconds_bucket{le=\"+Inf\"}"));
}

#[tokio::test]
async fn test_openapi_document() {
    let app = test_app();
    let (status, body) = send_json(&app, "GET", "/openapi.json", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/workflow/start"].is_object());
}

// ─── Workflow lifecycle ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_workflow_with_mock_item() {
    let app = test_app();

    let (status, body) = send_json(
        &app,
        "POST",
        "/workflow/start",
        Some(json!({
            "jql": "project = UX",
            "post_to_jira": false,
            "mock_feedback_items": [
                {"key": "UX-900", "summary": "Cannot reset password", "description": "The reset link never arrives"}
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let workflow_id = body["workflow_id"].as_str().unwrap().to_string();
    let final_status = poll_until_complete(&app, &workflow_id).await;

    assert_eq!(final_status["current_status"], "Analysis complete");

    let results = final_status["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["ticket_id"], "UX-900");

    let story = &results[0]["user_story"];
    assert!(story["title"].as_str().unwrap().contains("As a user"));
    assert!(!story["acceptance_criteria"].as_array().unwrap().is_empty());

    // Step journal is present and ends in the completion step
    let steps = final_status["steps"].as_array().unwrap();
    assert!(!steps.is_empty());
    assert_eq!(steps.last().unwrap()["type"], "success");
}

#[tokio::test]
async fn test_workflow_sample_fallback() {
    let app = test_app();

    let (status, body) = send_json(
        &app,
        "POST",
        "/workflow/start",
        Some(json!({"jql": "project = UX", "max_results": 5, "mock_feedback_items": []})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let workflow_id = body["workflow_id"].as_str().unwrap().to_string();
    let final_status = poll_until_complete(&app, &workflow_id).await;

    // No Jira token configured: the built-in sample set shows up
    let tickets = final_status["tickets"].as_array().unwrap();
    assert_eq!(tickets.len(), 5);
    assert_eq!(tickets[0]["key"], "UX-101");

    let results = final_status["results"].as_array().unwrap();
    assert_eq!(results.len(), tickets.len());
    for (result, ticket) in results.iter().zip(tickets) {
        assert_eq!(result["ticket_id"], ticket["key"]);
    }
}

#[tokio::test]
async fn test_workflow_status_unknown_id() {
    let app = test_app();

    let (status, body) = send_json(
        &app,
        "GET",
        "/workflow/00000000-0000-0000-0000-000000000000/status",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_workflows_do_not_cross_contaminate() {
    let app = test_app();

    let start = |key: &str| {
        json!({
            "jql": "project = UX",
            "mock_feedback_items": [{"key": key, "summary": format!("Feedback for {key}")}]
        })
    };

    let (_, first) = send_json(&app, "POST", "/workflow/start", Some(start("UX-1"))).await;
    let (_, second) = send_json(&app, "POST", "/workflow/start", Some(start("UX-2"))).await;

    let first_id = first["workflow_id"].as_str().unwrap().to_string();
    let second_id = second["workflow_id"].as_str().unwrap().to_string();
    assert_ne!(first_id, second_id);

    let first_final = poll_until_complete(&app, &first_id).await;
    let second_final = poll_until_complete(&app, &second_id).await;

    assert_eq!(first_final["results"][0]["ticket_id"], "UX-1");
    assert_eq!(second_final["results"][0]["ticket_id"], "UX-2");
    assert_eq!(first_final["results"].as_array().unwrap().len(), 1);
    assert_eq!(second_final["results"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_workflow_failure_surfaces_in_status_only() {
    let app = test_app_with_model(true);

    // Start always answers 200, even though the model is broken
    let (status, body) = send_json(
        &app,
        "POST",
        "/workflow/start",
        Some(json!({
            "jql": "project = UX",
            "mock_feedback_items": [{"key": "UX-900", "summary": "Cannot reset password"}]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let workflow_id = body["workflow_id"].as_str().unwrap().to_string();
    let final_status = poll_until_complete(&app, &workflow_id).await;

    assert!(final_status["current_status"]
        .as_str()
        .unwrap()
        .starts_with("Error:"));
    assert!(final_status["results"].as_array().unwrap().is_empty());

    let steps = final_status["steps"].as_array().unwrap();
    assert_eq!(steps.last().unwrap()["type"], "error");
}

#[tokio::test]
async fn test_cancel_unknown_workflow() {
    let app = test_app();

    let (status, _) = send_json(
        &app,
        "POST",
        "/workflow/00000000-0000-0000-0000-000000000000/cancel",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ─── Synchronous analysis ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_analyze_feedback() {
    let app = test_app();

    let (status, body) = send_json(
        &app,
        "POST",
        "/analyze-feedback?persist_thread=false",
        Some(json!({"jql": "project = UX", "max_results": 2})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["ticket_id"], "UX-101");
    assert_eq!(results[1]["ticket_id"], "UX-102");
    assert_eq!(results[0]["pm_response"], PM_TEXT);
}

// ─── Jira stub ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_post_comment_stub() {
    let app = test_app();

    let (status, body) = send_json(
        &app,
        "POST",
        "/jira/post-comment",
        Some(json!({"ticket_id": "UX-101", "comment": "On our roadmap!"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Comment posted to ticket UX-101");
}
