//! Story and response generation.
//!
//! Two independent operations, each one model call with a fixed system prompt:
//! converting a feedback ticket into a structured user story, and drafting a
//! short product-manager acknowledgment. Story parsing is best-effort and never
//! fails; model call errors propagate to the caller.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use utoipa::ToSchema;

use crate::api::{CompletionModel, ProviderError};

const USER_STORY_SYSTEM_PROMPT: &str = "\
You are a Product Manager Assistant. Convert customer feedback into a well-structured user story.
The user story should include:
1. Title (in the format \"As a user, I want to...\")
2. Description explaining the value and reasoning
3. 2-3 acceptance criteria that are testable and clear";

const PM_RESPONSE_SYSTEM_PROMPT: &str = "\
You are a Product Manager responding to customer feedback. Write a brief, empathetic response that:
1. Thanks the user for their feedback
2. Acknowledges their specific concerns or compliments
3. Indicates what action will be taken (if appropriate)
4. Keeps the response under 3-4 sentences

Be professional, helpful, and concise.";

/// Criteria substituted when extraction finds none
const GENERIC_CRITERIA: [&str; 3] = [
    "Functionality works as expected",
    "User interface is intuitive",
    "Performance is optimized",
];

/// Criteria used by the fully synthetic fallback story
const FALLBACK_CRITERIA: [&str; 3] = [
    "Functionality works as expected",
    "UI is intuitive and user-friendly",
    "Performance is optimized",
];

/// A structured user story derived from one feedback ticket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserStory {
    pub title: String,
    pub description: String,
    /// Never empty: extracted criteria or the generic fallback
    pub acceptance_criteria: Vec<String>,
}

/// Generates user stories and PM responses via a completion model
pub struct StoryGenerator {
    model: Arc<dyn CompletionModel>,
}

impl StoryGenerator {
    pub fn new(model: Arc<dyn CompletionModel>) -> Self {
        Self { model }
    }

    /// Convert a ticket's feedback text into a structured user story.
    ///
    /// The model's free text is parsed best-effort; any shape the parser cannot
    /// handle degrades to a deterministic synthetic story. Only a failed model
    /// call surfaces as an error.
    pub async fn generate_user_story(
        &self,
        summary: &str,
        description: &str,
    ) -> Result<UserStory, ProviderError> {
        info!(summary, "Creating user story");

        let user_content =
            format!("Feedback summary: {summary}\n\nFeedback description: {description}");

        let started = Instant::now();
        let text = self
            .model
            .complete(USER_STORY_SYSTEM_PROMPT, &user_content)
            .await?;
        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "User story completion finished"
        );

        Ok(parse_user_story(&text, summary))
    }

    /// Draft a short empathetic PM acknowledgment for a ticket.
    ///
    /// Returns the model's text verbatim, trimmed. Call errors propagate.
    pub async fn generate_pm_response(
        &self,
        ticket_id: &str,
        summary: &str,
        description: &str,
    ) -> Result<String, ProviderError> {
        info!(ticket_id, summary, "Creating PM response");

        let user_content = format!(
            "Ticket ID: {ticket_id}\nFeedback summary: {summary}\nFeedback description: {description}"
        );

        let started = Instant::now();
        let text = self
            .model
            .complete(PM_RESPONSE_SYSTEM_PROMPT, &user_content)
            .await?;
        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "PM response completion finished"
        );

        Ok(text.trim().to_string())
    }
}

/// Parse model text into a user story. Total: any unparseable shape falls back
/// to a synthetic story built from the input summary.
fn parse_user_story(text: &str, summary: &str) -> UserStory {
    let lines: Vec<&str> = text.lines().collect();

    let Some(title_idx) = lines.iter().position(|line| line.contains("As a user")) else {
        warn!("No title line in model output, using synthetic story");
        return synthetic_story(summary);
    };

    let criteria_idx = lines
        .iter()
        .position(|line| line.to_lowercase().contains("criteria"))
        .unwrap_or(lines.len());

    let description = if title_idx + 1 < criteria_idx {
        lines[title_idx + 1..criteria_idx].join("\n").trim().to_string()
    } else {
        String::new()
    };

    let criteria: Vec<String> = lines
        .iter()
        .skip(criteria_idx)
        .filter_map(|line| strip_list_marker(line))
        .collect();

    let acceptance_criteria = if criteria.is_empty() {
        GENERIC_CRITERIA.iter().map(ToString::to_string).collect()
    } else {
        criteria
    };

    UserStory {
        title: lines[title_idx].trim().to_string(),
        description,
        acceptance_criteria,
    }
}

/// Extract the content of a `-`/`*`/digit-marked list line, marker stripped.
/// Returns None for anything else.
fn strip_list_marker(line: &str) -> Option<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    let rest = if let Some(rest) = trimmed.strip_prefix('-').or_else(|| trimmed.strip_prefix('*')) {
        rest
    } else if trimmed.starts_with(|c: char| c.is_ascii_digit()) {
        let rest = trimmed.trim_start_matches(|c: char| c.is_ascii_digit());
        rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')).unwrap_or(rest)
    } else {
        return None;
    };

    let content = rest.trim();
    (!content.is_empty()).then(|| content.to_string())
}

/// Deterministic fallback story built from the ticket summary
fn synthetic_story(summary: &str) -> UserStory {
    UserStory {
        title: format!("As a user, I want to {}", summary.to_lowercase()),
        description: "This feature would improve user experience by addressing the feedback provided."
            .to_string(),
        acceptance_criteria: FALLBACK_CRITERIA.iter().map(ToString::to_string).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Model returning a fixed script, or an error
    struct ScriptedModel {
        response: Result<String, ProviderError>,
    }

    impl ScriptedModel {
        fn ok(text: &str) -> Arc<Self> {
            Arc::new(Self {
                response: Ok(text.to_string()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                response: Err(ProviderError::network("scripted", "connection refused")),
            })
        }
    }

    #[async_trait]
    impl CompletionModel for ScriptedModel {
        fn name(&self) -> &str {
            "scripted"
        }

        fn is_configured(&self) -> bool {
            true
        }

        async fn complete(&self, _system: &str, _user: &str) -> Result<String, ProviderError> {
            self.response.clone()
        }
    }

    const WELL_FORMED: &str = "\
As a user, I want to find the export button quickly
The export action should be reachable from the main toolbar so users
stop hunting through submenus.
Acceptance criteria:
- Export button is visible in the main toolbar
- Button has an icon and a label
- Tooltip lists available export formats";

    #[test]
    fn test_parse_well_formed() {
        let story = parse_user_story(WELL_FORMED, "fallback summary");

        assert_eq!(
            story.title,
            "As a user, I want to find the export button quickly"
        );
        assert!(story.description.contains("main toolbar"));
        assert_eq!(story.acceptance_criteria.len(), 3);
        assert_eq!(
            story.acceptance_criteria[0],
            "Export button is visible in the main toolbar"
        );
    }

    #[test]
    fn test_parse_numbered_and_starred_criteria() {
        let text = "\
Title: As a user, I want faster dashboards
Load time matters.
Criteria
1. Dashboard renders within 2 seconds
2) Spinner shows during load
* Results are cached";
        let story = parse_user_story(text, "x");

        assert_eq!(
            story.acceptance_criteria,
            vec![
                "Dashboard renders within 2 seconds",
                "Spinner shows during load",
                "Results are cached"
            ]
        );
    }

    #[test]
    fn test_parse_missing_title_falls_back() {
        let story = parse_user_story("Some unrelated rambling\nwith no story", "Dashboard loads too slowly");

        assert_eq!(story.title, "As a user, I want to dashboard loads too slowly");
        assert_eq!(story.acceptance_criteria.len(), 3);
    }

    #[test]
    fn test_parse_no_criteria_uses_generic() {
        let text = "As a user, I want bulk editing\nEditing one task at a time wastes time.";
        let story = parse_user_story(text, "x");

        assert_eq!(story.acceptance_criteria.len(), 3);
        assert_eq!(story.acceptance_criteria[0], "Functionality works as expected");
    }

    #[test]
    fn test_criteria_never_empty_with_empty_section() {
        let text = "As a user, I want dark mode\nNice for night work.\nAcceptance criteria:";
        let story = parse_user_story(text, "x");

        assert!(!story.acceptance_criteria.is_empty());
    }

    #[test]
    fn test_strip_list_marker() {
        assert_eq!(strip_list_marker("- item"), Some("item".to_string()));
        assert_eq!(strip_list_marker("* item"), Some("item".to_string()));
        assert_eq!(strip_list_marker("3. item"), Some("item".to_string()));
        assert_eq!(strip_list_marker("12) item"), Some("item".to_string()));
        assert_eq!(strip_list_marker("plain prose"), None);
        assert_eq!(strip_list_marker("   "), None);
        assert_eq!(strip_list_marker("-"), None);
    }

    #[tokio::test]
    async fn test_generate_user_story() {
        let generator = StoryGenerator::new(ScriptedModel::ok(WELL_FORMED));
        let story = generator
            .generate_user_story("Difficult to find the export button", "")
            .await
            .unwrap();

        assert!(story.title.contains("As a user"));
        assert!(!story.acceptance_criteria.is_empty());
    }

    #[tokio::test]
    async fn test_generate_user_story_call_error_propagates() {
        let generator = StoryGenerator::new(ScriptedModel::failing());
        let result = generator.generate_user_story("x", "y").await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_generate_pm_response_trims() {
        let generator =
            StoryGenerator::new(ScriptedModel::ok("  Thank you for flagging this!  \n"));
        let response = generator
            .generate_pm_response("UX-101", "summary", "description")
            .await
            .unwrap();

        assert_eq!(response, "Thank you for flagging this!");
    }

    #[tokio::test]
    async fn test_generate_pm_response_call_error_propagates() {
        let generator = StoryGenerator::new(ScriptedModel::failing());
        let result = generator.generate_pm_response("UX-101", "x", "y").await;

        assert!(result.is_err());
    }
}
