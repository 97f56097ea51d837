//! Error types for external API providers

use thiserror::Error;

/// Errors that can occur when interacting with external APIs
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// 401 Unauthorized - token invalid or expired
    #[error("{provider}: Unauthorized (401)")]
    Unauthorized { provider: String },

    /// 403 Forbidden - token lacks required permissions
    #[error("{provider}: Forbidden (403) - insufficient permissions")]
    Forbidden { provider: String },

    /// 429 Rate Limited
    #[error("{provider}: Rate limited{}", .retry_after_secs.map(|s| format!(" - retry after {s}s")).unwrap_or_default())]
    RateLimited {
        provider: String,
        retry_after_secs: Option<u64>,
    },

    /// Network or timeout error
    #[error("{provider}: Network error - {message}")]
    Network { provider: String, message: String },

    /// Other HTTP errors
    #[error("{provider}: HTTP {status} - {message}")]
    Http {
        provider: String,
        status: u16,
        message: String,
    },

    /// Provider not configured (no token in environment)
    #[error("{provider}: Not configured (no API token)")]
    NotConfigured { provider: String },
}

impl ProviderError {
    /// Check if this is an authentication error (401 or 403)
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            ProviderError::Unauthorized { .. } | ProviderError::Forbidden { .. }
        )
    }

    /// Check if this is a rate limiting error
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ProviderError::RateLimited { .. })
    }

    /// Get the provider name for this error
    pub fn provider_name(&self) -> &str {
        match self {
            ProviderError::Unauthorized { provider }
            | ProviderError::Forbidden { provider }
            | ProviderError::RateLimited { provider, .. }
            | ProviderError::Network { provider, .. }
            | ProviderError::Http { provider, .. }
            | ProviderError::NotConfigured { provider } => provider,
        }
    }

    /// Create an unauthorized error for a provider
    pub fn unauthorized(provider: impl Into<String>) -> Self {
        ProviderError::Unauthorized {
            provider: provider.into(),
        }
    }

    /// Create a forbidden error for a provider
    pub fn forbidden(provider: impl Into<String>) -> Self {
        ProviderError::Forbidden {
            provider: provider.into(),
        }
    }

    /// Create a rate limited error for a provider
    pub fn rate_limited(provider: impl Into<String>, retry_after: Option<u64>) -> Self {
        ProviderError::RateLimited {
            provider: provider.into(),
            retry_after_secs: retry_after,
        }
    }

    /// Create a network error for a provider
    pub fn network(provider: impl Into<String>, message: impl Into<String>) -> Self {
        ProviderError::Network {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP error for a provider
    pub fn http(provider: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        ProviderError::Http {
            provider: provider.into(),
            status,
            message: message.into(),
        }
    }

    /// Create a not configured error for a provider
    pub fn not_configured(provider: impl Into<String>) -> Self {
        ProviderError::NotConfigured {
            provider: provider.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_auth_error() {
        assert!(ProviderError::unauthorized("jira").is_auth_error());
        assert!(ProviderError::forbidden("jira").is_auth_error());
        assert!(!ProviderError::rate_limited("jira", None).is_auth_error());
        assert!(!ProviderError::network("jira", "timeout").is_auth_error());
    }

    #[test]
    fn test_provider_name() {
        assert_eq!(
            ProviderError::unauthorized("anthropic").provider_name(),
            "anthropic"
        );
        assert_eq!(
            ProviderError::rate_limited("jira", Some(60)).provider_name(),
            "jira"
        );
    }

    #[test]
    fn test_display() {
        let err = ProviderError::rate_limited("anthropic", Some(30));
        assert_eq!(err.to_string(), "anthropic: Rate limited - retry after 30s");

        let err = ProviderError::rate_limited("anthropic", None);
        assert_eq!(err.to_string(), "anthropic: Rate limited");

        let err = ProviderError::not_configured("jira");
        assert_eq!(err.to_string(), "jira: Not configured (no API token)");
    }
}
