//! Synchronous feedback analysis endpoint.

use axum::extract::{Query, State};
use axum::Json;
use tracing::info;

use crate::rest::dto::{AnalyzeFeedbackRequest, AnalyzeFeedbackResponse, AnalyzeQuery};
use crate::rest::state::ApiState;

/// Analyze Jira feedback tickets and convert them to user stories.
///
/// Runs the fetch-then-generate pipeline inline, without step tracking, and
/// returns the accumulated results.
#[utoipa::path(
    post,
    path = "/analyze-feedback",
    tag = "Analysis",
    params(
        ("persist_thread" = bool, Query, description = "Whether to persist the agent thread across requests"),
        ("user_id" = Option<String>, Query, description = "Optional user ID for personalization")
    ),
    request_body = AnalyzeFeedbackRequest,
    responses(
        (status = 200, description = "Analysis results", body = AnalyzeFeedbackResponse)
    )
)]
pub async fn analyze_feedback(
    State(state): State<ApiState>,
    Query(query): Query<AnalyzeQuery>,
    Json(request): Json<AnalyzeFeedbackRequest>,
) -> Json<AnalyzeFeedbackResponse> {
    info!(
        jql = %request.jql,
        max_results = request.max_results,
        persist_thread = query.persist_thread,
        user_id = query.user_id.as_deref().unwrap_or("default"),
        "Received analyze feedback request"
    );

    let results = state
        .orchestrator
        .analyze(&request.jql, request.max_results)
        .await;

    Json(AnalyzeFeedbackResponse { results })
}
