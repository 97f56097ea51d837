//! Workflow orchestration.
//!
//! Drives one analysis workflow end to end: resolve the ticket list, then for
//! each ticket run the two generation calls in order, journaling a step entry
//! around every phase. Strictly sequential per workflow; one orchestrator task
//! owns one record.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use utoipa::ToSchema;

use crate::api::{JiraClient, JiraTicket, ProviderError};
use crate::generator::{StoryGenerator, UserStory};
use crate::metrics::ServiceMetrics;
use crate::workflow::record::{AnalysisResult, StepEntry};
use crate::workflow::registry::WorkflowHandle;

/// A caller-supplied feedback item that stands in for a fetched ticket
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct MockFeedbackItem {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub labels: Option<Vec<String>>,
}

/// Parameters for one workflow run
#[derive(Debug, Clone)]
pub struct WorkflowRequest {
    pub jql: String,
    pub max_results: usize,
    pub post_to_jira: bool,
    pub mock_feedback_items: Vec<MockFeedbackItem>,
}

/// Drives analysis workflows against the ticket source and the generator
pub struct Orchestrator {
    jira: Arc<JiraClient>,
    generator: StoryGenerator,
    metrics: Arc<ServiceMetrics>,
    pacing: std::time::Duration,
}

impl Orchestrator {
    pub fn new(
        jira: Arc<JiraClient>,
        generator: StoryGenerator,
        metrics: Arc<ServiceMetrics>,
        pacing: std::time::Duration,
    ) -> Self {
        Self {
            jira,
            generator,
            metrics,
            pacing,
        }
    }

    /// Run one workflow to completion, recording progress through `handle`.
    ///
    /// Every failure in the body is caught here, once: the record gets a
    /// terminal error step and an error status. Nothing already journaled is
    /// rolled back.
    pub async fn run(
        &self,
        handle: WorkflowHandle,
        request: WorkflowRequest,
        cancel: CancellationToken,
    ) {
        let started = Instant::now();
        let outcome = self.execute(&handle, &request, &cancel).await;
        self.metrics.observe_run_duration(started.elapsed());

        match outcome {
            Ok(processed) => {
                handle
                    .append_step(StepEntry::success(
                        "Analysis Complete",
                        format!("Processed {processed} tickets successfully"),
                    ))
                    .await;
                handle.complete("Analysis complete").await;
            }
            Err(e) => {
                error!(workflow_id = %handle.id(), error = %e, "Error in workflow");
                handle.fail(e.to_string()).await;
            }
        }
    }

    async fn execute(
        &self,
        handle: &WorkflowHandle,
        request: &WorkflowRequest,
        cancel: &CancellationToken,
    ) -> Result<usize> {
        handle
            .append_step(StepEntry::info(
                "Starting Workflow",
                format!("Starting analysis with JQL: {}", request.jql),
            ))
            .await;
        self.pause(cancel).await?;

        let tickets = self.resolve_tickets(handle, request, cancel).await?;
        handle.set_tickets(tickets.clone()).await;

        let total = tickets.len();
        for (index, ticket) in tickets.iter().enumerate() {
            handle
                .set_status(format!(
                    "Processing ticket {}/{}: {}",
                    index + 1,
                    total,
                    ticket.key
                ))
                .await;
            self.process_ticket(handle, request, cancel, ticket).await?;
        }

        Ok(total)
    }

    /// Resolve the ticket list: synthesize from caller-supplied mock items, or
    /// fetch from the ticket source
    async fn resolve_tickets(
        &self,
        handle: &WorkflowHandle,
        request: &WorkflowRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<JiraTicket>> {
        if !request.mock_feedback_items.is_empty() {
            let count = request.mock_feedback_items.len();
            handle
                .append_step(StepEntry::info(
                    "Using Mock Feedback Items",
                    format!("Using {count} mock feedback items instead of fetching from Jira"),
                ))
                .await;
            self.pause(cancel).await?;

            let tickets = synthesize_mock_tickets(&request.mock_feedback_items);
            handle
                .append_step(StepEntry::tool_call(
                    "create_mock_feedback",
                    "Creating mock feedback items",
                    json!({ "count": count }),
                    Some(format!("Created {count} mock feedback items")),
                ))
                .await;
            self.pause(cancel).await?;

            return Ok(tickets);
        }

        handle
            .append_step(StepEntry::info(
                "Fetching Jira Tickets",
                format!("Fetching tickets using JQL: {}", request.jql),
            ))
            .await;
        self.pause(cancel).await?;

        handle.set_status("Fetching Jira tickets...").await;
        ensure_active(cancel)?;
        let tickets = self
            .jira
            .fetch_feedback(&request.jql, request.max_results)
            .await;

        handle
            .append_step(StepEntry::tool_call(
                "get_jira_feedback",
                "Called get_jira_feedback to fetch tickets",
                json!({ "jql": request.jql, "max_results": request.max_results }),
                Some(format!("Retrieved {} tickets", tickets.len())),
            ))
            .await;
        self.pause(cancel).await?;

        Ok(tickets)
    }

    /// The fixed two-call pipeline for one ticket
    async fn process_ticket(
        &self,
        handle: &WorkflowHandle,
        request: &WorkflowRequest,
        cancel: &CancellationToken,
        ticket: &JiraTicket,
    ) -> Result<()> {
        let description = ticket.description.clone().unwrap_or_default();

        handle
            .append_step(StepEntry::info(
                format!("Processing Ticket {}", ticket.key),
                format!("Summary: {}", ticket.summary),
            ))
            .await;
        self.pause(cancel).await?;

        handle
            .append_step(StepEntry::thinking(
                "AI Thinking",
                format!(
                    "Analyzing feedback: '{}' to identify user needs and pain points...",
                    ticket.summary
                ),
            ))
            .await;
        self.pause(cancel).await?;

        let call_id = handle
            .append_step(StepEntry::tool_call(
                "create_user_story",
                "Converting feedback to user story",
                json!({ "summary": ticket.summary, "description": description }),
                None,
            ))
            .await;
        self.pause(cancel).await?;

        ensure_active(cancel)?;
        let user_story = self
            .generator
            .generate_user_story(&ticket.summary, &description)
            .await?;
        handle
            .append_step(StepEntry::tool_result(
                call_id,
                "User story created successfully",
            ))
            .await;

        handle
            .append_step(StepEntry::success("User Story Created", render_story(&user_story)))
            .await;
        self.pause(cancel).await?;

        handle
            .append_step(StepEntry::thinking(
                "AI Thinking",
                format!(
                    "Crafting an empathetic product manager response for ticket {}...",
                    ticket.key
                ),
            ))
            .await;
        self.pause(cancel).await?;

        let call_id = handle
            .append_step(StepEntry::tool_call(
                "suggest_pm_response",
                "Generating PM response",
                json!({
                    "ticket_id": ticket.key,
                    "summary": ticket.summary,
                    "description": description
                }),
                None,
            ))
            .await;
        self.pause(cancel).await?;

        ensure_active(cancel)?;
        let pm_response = self
            .generator
            .generate_pm_response(&ticket.key, &ticket.summary, &description)
            .await?;
        handle
            .append_step(StepEntry::tool_result(
                call_id,
                "PM response generated successfully",
            ))
            .await;

        handle
            .append_step(StepEntry::success("PM Response Created", pm_response.clone()))
            .await;
        self.pause(cancel).await?;

        handle
            .push_result(AnalysisResult {
                ticket_id: ticket.key.clone(),
                user_story,
                pm_response,
            })
            .await;
        self.metrics.inc_tickets_processed(1);

        handle
            .append_step(StepEntry::info(
                format!("Completed Processing Ticket {}", ticket.key),
                format!(
                    "Successfully created user story and PM response for '{}'",
                    ticket.summary
                ),
            ))
            .await;
        self.pause(cancel).await?;

        if request.post_to_jira {
            handle
                .append_step(StepEntry::info(
                    "Posting to Jira",
                    format!("Posting response to ticket {}", ticket.key),
                ))
                .await;
            self.pause(cancel).await?;

            // Simulated post; no request leaves the process
            handle
                .append_step(StepEntry::success(
                    "Posted to Jira",
                    format!("Successfully posted response to {}", ticket.key),
                ))
                .await;
            self.pause(cancel).await?;
        }

        Ok(())
    }

    /// Analyze feedback synchronously, without step tracking.
    ///
    /// Per-ticket failures are logged and skipped; the remaining tickets still
    /// produce results.
    pub async fn analyze(&self, jql: &str, max_results: usize) -> Vec<AnalysisResult> {
        let started = Instant::now();
        info!(jql, max_results, "Starting feedback analysis");

        let tickets = self.jira.fetch_feedback(jql, max_results).await;
        info!(count = tickets.len(), "Retrieved tickets");

        let mut results = Vec::with_capacity(tickets.len());
        for ticket in &tickets {
            match self.analyze_ticket(ticket).await {
                Ok(result) => {
                    self.metrics.inc_tickets_processed(1);
                    info!(ticket_id = %ticket.key, "Processed ticket");
                    results.push(result);
                }
                Err(e) => {
                    warn!(ticket_id = %ticket.key, error = %e, "Error processing ticket");
                }
            }
        }

        self.metrics.observe_run_duration(started.elapsed());
        info!(ticket_count = results.len(), "Feedback analysis complete");
        results
    }

    async fn analyze_ticket(&self, ticket: &JiraTicket) -> Result<AnalysisResult, ProviderError> {
        let description = ticket.description.clone().unwrap_or_default();

        let user_story = self
            .generator
            .generate_user_story(&ticket.summary, &description)
            .await?;
        let pm_response = self
            .generator
            .generate_pm_response(&ticket.key, &ticket.summary, &description)
            .await?;

        Ok(AnalysisResult {
            ticket_id: ticket.key.clone(),
            user_story,
            pm_response,
        })
    }

    /// One pacing pause. Checks cancellation even when pacing is disabled.
    async fn pause(&self, cancel: &CancellationToken) -> Result<()> {
        ensure_active(cancel)?;
        if self.pacing.is_zero() {
            return Ok(());
        }
        tokio::select! {
            () = cancel.cancelled() => bail!("workflow cancelled"),
            () = tokio::time::sleep(self.pacing) => Ok(()),
        }
    }
}

fn ensure_active(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        bail!("workflow cancelled");
    }
    Ok(())
}

/// Build tickets from caller-supplied mock feedback items
fn synthesize_mock_tickets(items: &[MockFeedbackItem]) -> Vec<JiraTicket> {
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| JiraTicket {
            id: (1000 + idx).to_string(),
            key: item
                .key
                .clone()
                .unwrap_or_else(|| format!("MOCK-{}", idx + 1)),
            summary: item
                .summary
                .clone()
                .unwrap_or_else(|| "Mock feedback".to_string()),
            description: Some(item.description.clone().unwrap_or_default()),
            reporter: Some("Mock User".to_string()),
            created: Some(Utc::now().format("%Y-%m-%dT%H:%M:%S%.3f+0000").to_string()),
            labels: item
                .labels
                .clone()
                .unwrap_or_else(|| vec!["feedback".to_string()]),
        })
        .collect()
}

/// Render a story the way the status UI displays it
fn render_story(story: &UserStory) -> String {
    let criteria = story
        .acceptance_criteria
        .iter()
        .map(|criterion| format!("- {criterion}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Title: {}\n\nDescription: {}\n\nAcceptance Criteria:\n{}",
        story.title, story.description, criteria
    )
}
