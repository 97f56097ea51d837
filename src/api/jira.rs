//! Jira feedback ticket client
//!
//! Fetches feedback tickets via the Jira Cloud search API. When no API token is
//! configured, or when a fetch fails, the client degrades to a fixed built-in
//! sample set instead of surfacing an error.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use utoipa::ToSchema;

use crate::api::error::ProviderError;
use crate::config::JiraConfig;

const PROVIDER_NAME: &str = "jira";

/// Page size for the Jira search API
const SEARCH_PAGE_SIZE: usize = 50;

/// Pause between search pages, to respect Jira's rate limits
const PAGE_PAUSE: Duration = Duration::from_millis(500);

/// A single feedback ticket fetched from Jira (or synthesized)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct JiraTicket {
    pub id: String,
    pub key: String,
    pub summary: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub reporter: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
}

/// Client for fetching feedback tickets from the Jira Cloud API
pub struct JiraClient {
    base_url: String,
    user_email: String,
    api_token: String,
    client: Client,
    use_samples: bool,
}

impl JiraClient {
    /// Create a client from configuration.
    ///
    /// An empty API token switches the client permanently into sample mode
    /// for the life of the process.
    pub fn new(config: &JiraConfig, request_timeout: Duration) -> Self {
        let use_samples = config.api_token.is_empty() || config.base_url.is_empty();
        if use_samples {
            info!("Jira credentials not configured, serving built-in sample tickets");
        }

        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .unwrap_or_default();

        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user_email: config.user_email.clone(),
            api_token: config.api_token.clone(),
            client,
            use_samples,
        }
    }

    /// Whether real Jira credentials are configured
    pub fn is_configured(&self) -> bool {
        !self.use_samples
    }

    /// Fetch feedback tickets matching a JQL query, capped at `max_results`.
    ///
    /// Never fails: unconfigured credentials serve the sample set, and a fetch
    /// error degrades to a short sample fallback.
    pub async fn fetch_feedback(&self, jql: &str, max_results: usize) -> Vec<JiraTicket> {
        info!(jql, max_results, use_samples = self.use_samples, "Fetching Jira tickets");

        if self.use_samples {
            return sample_tickets(max_results);
        }

        match self.search_paginated(jql, max_results).await {
            Ok(tickets) => tickets,
            Err(e) => {
                warn!(error = %e, "Jira fetch failed, falling back to sample tickets");
                sample_tickets(3)
            }
        }
    }

    /// Paginate the search API until a short page or `max_results` issues
    async fn search_paginated(
        &self,
        jql: &str,
        max_results: usize,
    ) -> Result<Vec<JiraTicket>, ProviderError> {
        let mut issues: Vec<JiraIssue> = Vec::new();
        let mut start_at = 0usize;

        loop {
            let page = self.search_page(jql, start_at).await?;
            let page_len = page.issues.len();
            if page_len == 0 {
                break;
            }

            issues.extend(page.issues);

            if page_len < SEARCH_PAGE_SIZE || issues.len() >= max_results {
                break;
            }

            start_at += SEARCH_PAGE_SIZE;
            tokio::time::sleep(PAGE_PAUSE).await;
        }

        issues.truncate(max_results);
        Ok(issues.into_iter().map(JiraTicket::from).collect())
    }

    /// Fetch one page of search results
    async fn search_page(&self, jql: &str, start_at: usize) -> Result<SearchResponse, ProviderError> {
        let url = format!("{}/rest/api/2/search", self.base_url);
        debug!(url, start_at, "Jira search page");

        let body = SearchRequest {
            jql,
            start_at,
            max_results: SEARCH_PAGE_SIZE,
        };

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.user_email, Some(&self.api_token))
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::network(PROVIDER_NAME, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return match status.as_u16() {
                401 => Err(ProviderError::unauthorized(PROVIDER_NAME)),
                403 => Err(ProviderError::forbidden(PROVIDER_NAME)),
                429 => Err(ProviderError::rate_limited(PROVIDER_NAME, None)),
                code => Err(ProviderError::http(PROVIDER_NAME, code, text)),
            };
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::http(PROVIDER_NAME, 0, format!("Parse error: {e}")))
    }
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    jql: &'a str,
    #[serde(rename = "startAt")]
    start_at: usize,
    #[serde(rename = "maxResults")]
    max_results: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    issues: Vec<JiraIssue>,
}

#[derive(Debug, Deserialize)]
struct JiraIssue {
    id: String,
    key: String,
    fields: JiraIssueFields,
}

#[derive(Debug, Deserialize)]
struct JiraIssueFields {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    reporter: Option<JiraReporter>,
    #[serde(default)]
    created: Option<String>,
    #[serde(default)]
    labels: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct JiraReporter {
    #[serde(rename = "displayName")]
    display_name: Option<String>,
}

impl From<JiraIssue> for JiraTicket {
    fn from(issue: JiraIssue) -> Self {
        Self {
            id: issue.id,
            key: issue.key,
            summary: issue.fields.summary.unwrap_or_default(),
            description: issue.fields.description,
            reporter: issue.fields.reporter.and_then(|r| r.display_name),
            created: issue.fields.created,
            labels: issue.fields.labels,
        }
    }
}

/// The fixed, hand-authored sample set served when Jira is unavailable,
/// truncated to `max_results`
pub fn sample_tickets(max_results: usize) -> Vec<JiraTicket> {
    let mut tickets = vec![
        JiraTicket {
            id: "10001".to_string(),
            key: "UX-101".to_string(),
            summary: "Difficult to find the export button".to_string(),
            description: Some(
                "I was trying to export my data but couldn't find the button anywhere. \
                 After 5 minutes of searching, I found it hidden in a submenu. \
                 This should be more prominent."
                    .to_string(),
            ),
            reporter: Some("Jane Smith".to_string()),
            created: Some("2023-11-01T10:30:00.000+0000".to_string()),
            labels: vec!["ux-feedback".to_string(), "export".to_string()],
        },
        JiraTicket {
            id: "10002".to_string(),
            key: "UX-102".to_string(),
            summary: "Dashboard loads too slowly".to_string(),
            description: Some(
                "Every time I log in, the dashboard takes at least 10 seconds to load. \
                 This is frustrating when I need to quickly check something."
                    .to_string(),
            ),
            reporter: Some("John Doe".to_string()),
            created: Some("2023-11-02T14:15:00.000+0000".to_string()),
            labels: vec!["ux-feedback".to_string(), "performance".to_string()],
        },
        JiraTicket {
            id: "10003".to_string(),
            key: "UX-103".to_string(),
            summary: "Love the new dark mode feature".to_string(),
            description: Some(
                "The dark mode you added in the last update is fantastic! It's easier \
                 on my eyes when working late at night. Great job!"
                    .to_string(),
            ),
            reporter: Some("Alex Johnson".to_string()),
            created: Some("2023-11-03T09:45:00.000+0000".to_string()),
            labels: vec!["ux-feedback".to_string(), "positive".to_string()],
        },
        JiraTicket {
            id: "10004".to_string(),
            key: "UX-104".to_string(),
            summary: "Search functionality doesn't find relevant results".to_string(),
            description: Some(
                "When I search for keywords that I know exist in my documents, the \
                 search often returns no results or irrelevant ones. The search \
                 algorithm needs improvement."
                    .to_string(),
            ),
            reporter: Some("Sarah Williams".to_string()),
            created: Some("2023-11-04T11:20:00.000+0000".to_string()),
            labels: vec!["ux-feedback".to_string(), "search".to_string()],
        },
        JiraTicket {
            id: "10005".to_string(),
            key: "UX-105".to_string(),
            summary: "Need bulk edit feature for tasks".to_string(),
            description: Some(
                "Currently I have to edit each task individually which is \
                 time-consuming. It would be great to have a way to select multiple \
                 tasks and edit them all at once."
                    .to_string(),
            ),
            reporter: Some("Mike Brown".to_string()),
            created: Some("2023-11-05T16:00:00.000+0000".to_string()),
            labels: vec!["ux-feedback".to_string(), "feature-request".to_string()],
        },
    ];

    tickets.truncate(max_results);
    tickets
}
