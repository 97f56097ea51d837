//! Data Transfer Objects for the REST API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::workflow::{AnalysisResult, MockFeedbackItem, WorkflowRecord, WorkflowRequest};

// =============================================================================
// Health
// =============================================================================

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

// =============================================================================
// Synchronous analysis
// =============================================================================

/// Request to analyze feedback synchronously
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AnalyzeFeedbackRequest {
    /// JQL query selecting the feedback tickets
    pub jql: String,
    #[serde(default = "default_analyze_max_results")]
    pub max_results: usize,
}

fn default_analyze_max_results() -> usize {
    50
}

/// Query parameters accepted by the analyze endpoint
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AnalyzeQuery {
    /// Whether to persist the agent thread across requests
    #[serde(default)]
    pub persist_thread: bool,
    /// Optional user ID for personalization
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AnalyzeFeedbackResponse {
    pub results: Vec<AnalysisResult>,
}

// =============================================================================
// Workflows
// =============================================================================

/// Request to start a background analysis workflow
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StartWorkflowRequest {
    pub jql: String,
    #[serde(default = "default_workflow_max_results")]
    pub max_results: usize,
    #[serde(default)]
    pub persist_thread: bool,
    #[serde(default)]
    pub post_to_jira: bool,
    #[serde(default)]
    pub mock_feedback_items: Vec<MockFeedbackItem>,
}

fn default_workflow_max_results() -> usize {
    3
}

impl StartWorkflowRequest {
    /// Convert into the orchestrator's run parameters
    pub fn into_workflow_request(self) -> WorkflowRequest {
        WorkflowRequest {
            jql: self.jql,
            max_results: self.max_results,
            post_to_jira: self.post_to_jira,
            mock_feedback_items: self.mock_feedback_items,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StartWorkflowResponse {
    pub workflow_id: Uuid,
}

/// Full status snapshot of one workflow
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WorkflowStatusResponse {
    pub workflow_id: Uuid,
    pub is_complete: bool,
    pub current_status: String,
    pub steps: Vec<crate::workflow::StepEntry>,
    pub results: Vec<AnalysisResult>,
    pub tickets: Vec<crate::api::JiraTicket>,
}

impl From<WorkflowRecord> for WorkflowStatusResponse {
    fn from(record: WorkflowRecord) -> Self {
        Self {
            workflow_id: record.workflow_id,
            is_complete: record.is_complete,
            current_status: record.current_status,
            steps: record.steps,
            results: record.results,
            tickets: record.tickets,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CancelWorkflowResponse {
    pub success: bool,
}

// =============================================================================
// Jira comment stub
// =============================================================================

/// Request to post a comment back to the tracker
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct JiraCommentRequest {
    pub ticket_id: String,
    pub comment: String,
}

/// Stub acknowledgment; no comment is actually posted
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct JiraCommentResponse {
    pub success: bool,
    pub message: String,
}
