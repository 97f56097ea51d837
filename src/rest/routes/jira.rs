//! Jira comment stub endpoint.

use axum::extract::State;
use axum::Json;
use tracing::info;

use crate::rest::dto::{JiraCommentRequest, JiraCommentResponse};
use crate::rest::state::ApiState;

/// Post a comment to a Jira ticket.
///
/// Explicit stub: acknowledges the request without contacting the tracker.
#[utoipa::path(
    post,
    path = "/jira/post-comment",
    tag = "Jira",
    request_body = JiraCommentRequest,
    responses(
        (status = 200, description = "Comment acknowledged (simulated)", body = JiraCommentResponse)
    )
)]
pub async fn post_comment(
    State(state): State<ApiState>,
    Json(request): Json<JiraCommentRequest>,
) -> Json<JiraCommentResponse> {
    info!(ticket_id = %request.ticket_id, "Posting comment to Jira (simulated)");

    let pacing = state.config.pacing();
    if !pacing.is_zero() {
        tokio::time::sleep(pacing).await;
    }

    Json(JiraCommentResponse {
        success: true,
        message: format!("Comment posted to ticket {}", request.ticket_id),
    })
}
