//! Workflow lifecycle endpoints: start, poll, cancel.

use axum::extract::{Path, State};
use axum::Json;
use tracing::info;
use uuid::Uuid;

use crate::rest::dto::{
    CancelWorkflowResponse, StartWorkflowRequest, StartWorkflowResponse, WorkflowStatusResponse,
};
use crate::rest::error::ApiError;
use crate::rest::state::ApiState;

/// Start a new analysis workflow.
///
/// Fire-and-forget: the workflow runs as a background task and this always
/// answers immediately with the new id. Failures surface only through the
/// status poll.
#[utoipa::path(
    post,
    path = "/workflow/start",
    tag = "Workflows",
    request_body = StartWorkflowRequest,
    responses(
        (status = 200, description = "Workflow started", body = StartWorkflowResponse)
    )
)]
pub async fn start_workflow(
    State(state): State<ApiState>,
    Json(request): Json<StartWorkflowRequest>,
) -> Json<StartWorkflowResponse> {
    let (handle, cancel) = state.registry.create().await;
    let workflow_id = handle.id();

    info!(
        %workflow_id,
        jql = %request.jql,
        mock_items = request.mock_feedback_items.len(),
        persist_thread = request.persist_thread,
        "Starting workflow"
    );

    let orchestrator = state.orchestrator.clone();
    let workflow_request = request.into_workflow_request();
    tokio::spawn(async move {
        orchestrator.run(handle, workflow_request, cancel).await;
    });

    Json(StartWorkflowResponse { workflow_id })
}

/// Poll the status of a workflow
#[utoipa::path(
    get,
    path = "/workflow/{id}/status",
    tag = "Workflows",
    params(
        ("id" = Uuid, Path, description = "Workflow ID")
    ),
    responses(
        (status = 200, description = "Workflow status snapshot", body = WorkflowStatusResponse),
        (status = 404, description = "Unknown workflow ID")
    )
)]
pub async fn workflow_status(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WorkflowStatusResponse>, ApiError> {
    let record = state
        .registry
        .snapshot(id)
        .await
        .ok_or_else(|| ApiError::NotFound("Workflow not found".to_string()))?;

    Ok(Json(WorkflowStatusResponse::from(record)))
}

/// Cancel a running workflow.
///
/// The orchestrator notices at its next suspension point and terminates the
/// workflow through the error path.
#[utoipa::path(
    post,
    path = "/workflow/{id}/cancel",
    tag = "Workflows",
    params(
        ("id" = Uuid, Path, description = "Workflow ID")
    ),
    responses(
        (status = 200, description = "Cancellation requested", body = CancelWorkflowResponse),
        (status = 404, description = "Unknown workflow ID")
    )
)]
pub async fn cancel_workflow(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CancelWorkflowResponse>, ApiError> {
    if !state.registry.cancel(id).await {
        return Err(ApiError::NotFound("Workflow not found".to_string()));
    }

    info!(workflow_id = %id, "Workflow cancellation requested");
    Ok(Json(CancelWorkflowResponse { success: true }))
}
