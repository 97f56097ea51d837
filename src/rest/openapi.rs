//! OpenAPI specification builder using utoipa.

use utoipa::OpenApi;

use crate::rest::dto::{
    AnalyzeFeedbackRequest, AnalyzeFeedbackResponse, CancelWorkflowResponse, HealthResponse,
    JiraCommentRequest, JiraCommentResponse, StartWorkflowRequest, StartWorkflowResponse,
    WorkflowStatusResponse,
};
use crate::rest::error::ErrorResponse;

/// OpenAPI documentation for the triager REST API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Triager API",
        description = "Feedback triage service: analyzes Jira feedback tickets and converts them to user stories.",
        license(name = "MIT")
    ),
    paths(
        crate::rest::routes::health::health,
        crate::rest::routes::metrics::metrics,
        crate::rest::routes::analyze::analyze_feedback,
        crate::rest::routes::workflow::start_workflow,
        crate::rest::routes::workflow::workflow_status,
        crate::rest::routes::workflow::cancel_workflow,
        crate::rest::routes::jira::post_comment,
    ),
    components(
        schemas(
            HealthResponse,
            AnalyzeFeedbackRequest,
            AnalyzeFeedbackResponse,
            StartWorkflowRequest,
            StartWorkflowResponse,
            WorkflowStatusResponse,
            CancelWorkflowResponse,
            JiraCommentRequest,
            JiraCommentResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check and metrics endpoints"),
        (name = "Analysis", description = "Synchronous feedback analysis"),
        (name = "Workflows", description = "Background workflow lifecycle and polling"),
        (name = "Jira", description = "Tracker write-back stubs"),
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    /// Generate the OpenAPI specification as a JSON string
    pub fn json() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::openapi())
    }
}
