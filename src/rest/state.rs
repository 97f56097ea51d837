//! API state management for the REST server.

use std::sync::Arc;

use crate::api::{AnthropicClient, CompletionModel, JiraClient};
use crate::config::Config;
use crate::generator::StoryGenerator;
use crate::metrics::ServiceMetrics;
use crate::workflow::{Orchestrator, WorkflowRegistry};

/// Shared state for the REST API
#[derive(Clone)]
pub struct ApiState {
    pub config: Arc<Config>,
    pub registry: WorkflowRegistry,
    pub orchestrator: Arc<Orchestrator>,
    pub metrics: Arc<ServiceMetrics>,
}

impl ApiState {
    /// Create API state wired to the real Anthropic model
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let model = AnthropicClient::new(&config.model, config.request_timeout())?;
        if !model.is_configured() {
            tracing::warn!("Model API key not configured, generation calls will fail");
        }
        Ok(Self::with_model(config, Arc::new(model)))
    }

    /// Create API state with a caller-supplied model (tests, other providers)
    pub fn with_model(config: Config, model: Arc<dyn CompletionModel>) -> Self {
        let jira = Arc::new(JiraClient::new(&config.jira, config.request_timeout()));
        let generator = StoryGenerator::new(model);
        let metrics = Arc::new(ServiceMetrics::new());
        let orchestrator = Arc::new(Orchestrator::new(
            jira,
            generator,
            metrics.clone(),
            config.pacing(),
        ));

        Self {
            config: Arc::new(config),
            registry: WorkflowRegistry::new(),
            orchestrator,
            metrics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_state_new_unconfigured() {
        let state = ApiState::new(Config::default()).unwrap();
        assert_eq!(state.metrics.tickets_processed(), 0);
    }
}
