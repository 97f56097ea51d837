//! Workflow record and step journal types.
//!
//! A workflow's progress is an append-only journal of step entries that an
//! asynchronous poller reads to reconstruct what is happening. Outcomes of
//! in-flight tool calls are appended as `tool_result` entries referencing the
//! originating call's id, so no entry is ever rewritten.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::JiraTicket;
use crate::generator::UserStory;

/// Kind of a journal entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StepType {
    Info,
    Thinking,
    ToolCall,
    ToolResult,
    Success,
    Error,
}

/// One journal entry describing orchestration progress
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StepEntry {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub step_type: StepType,
    pub timestamp: DateTime<Utc>,
    /// Set only on tool_call entries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    /// Set only on tool_call entries
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub args: Option<serde_json::Value>,
    /// Inline outcome for calls resolved at append time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    /// On tool_result entries, the id of the originating tool_call
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refers_to: Option<Uuid>,
}

impl StepEntry {
    fn base(title: impl Into<String>, content: impl Into<String>, step_type: StepType) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            content: content.into(),
            step_type,
            timestamp: Utc::now(),
            tool_name: None,
            args: None,
            result: None,
            refers_to: None,
        }
    }

    pub fn info(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self::base(title, content, StepType::Info)
    }

    pub fn thinking(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self::base(title, content, StepType::Thinking)
    }

    pub fn success(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self::base(title, content, StepType::Success)
    }

    pub fn error(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self::base(title, content, StepType::Error)
    }

    /// A tool invocation. `result` is the inline outcome when it is already
    /// known; calls still in flight get a later [`StepEntry::tool_result`].
    pub fn tool_call(
        tool_name: &str,
        content: impl Into<String>,
        args: serde_json::Value,
        result: Option<String>,
    ) -> Self {
        let mut step = Self::base(format!("Tool Call: {tool_name}"), content, StepType::ToolCall);
        step.tool_name = Some(tool_name.to_string());
        step.args = Some(args);
        step.result = result;
        step
    }

    /// The outcome of an earlier tool_call entry
    pub fn tool_result(refers_to: Uuid, result: impl Into<String>) -> Self {
        let result = result.into();
        let mut step = Self::base("Tool Result", result.clone(), StepType::ToolResult);
        step.result = Some(result);
        step.refers_to = Some(refers_to);
        step
    }
}

/// One successfully processed ticket: its story and PM response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnalysisResult {
    pub ticket_id: String,
    pub user_story: UserStory,
    pub pm_response: String,
}

/// The full state of one analysis workflow
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WorkflowRecord {
    pub workflow_id: Uuid,
    pub is_complete: bool,
    pub current_status: String,
    pub steps: Vec<StepEntry>,
    pub results: Vec<AnalysisResult>,
    pub tickets: Vec<JiraTicket>,
    pub created_at: DateTime<Utc>,
}

impl WorkflowRecord {
    pub fn new(workflow_id: Uuid) -> Self {
        Self {
            workflow_id,
            is_complete: false,
            current_status: "Initializing agent...".to_string(),
            steps: Vec::new(),
            results: Vec::new(),
            tickets: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Whether this record has outlived the retention window
    pub fn is_expired(&self, retention: Duration, now: DateTime<Utc>) -> bool {
        let age = now.signed_duration_since(self.created_at);
        age.num_milliseconds() >= 0 && age.to_std().unwrap_or_default() > retention
    }
}
