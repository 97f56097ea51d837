//! Clients for external APIs (Jira, Anthropic)

use async_trait::async_trait;

pub mod anthropic;
pub mod error;
pub mod jira;

pub use anthropic::AnthropicClient;
pub use error::ProviderError;
pub use jira::{JiraClient, JiraTicket};

/// A text-completion language model.
///
/// The production implementation is [`AnthropicClient`]; tests substitute a
/// scripted model.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Provider name for logging and error attribution
    fn name(&self) -> &str;

    /// Whether an API key is present
    fn is_configured(&self) -> bool;

    /// Run one completion: a fixed system prompt plus user content, returning
    /// the model's text
    async fn complete(&self, system: &str, user: &str) -> Result<String, ProviderError>;
}
