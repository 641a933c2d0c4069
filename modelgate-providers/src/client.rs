//! The capability set every upstream adapter implements, per SPEC_FULL.md §4.C.

use async_trait::async_trait;
use modelgate_core::{ChatCompletionRequest, GatewayError, ProviderKind};
use std::time::Duration;

/// What an adapter hands back after a successful upstream call, before cost is computed — the
/// caller (the request pipeline) combines this with `modelgate_core::pricing::cost_usd`.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub content: String,
    pub model: String,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

#[async_trait]
pub trait ProviderClient: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Whether this adapter's upstream is known to serve `model`. Consulted by the router and by
    /// the pipeline's provider-config filtering step (§4.G step 4).
    fn supports(&self, model: &str) -> bool;

    async fn chat_complete(
        &self,
        request: &ChatCompletionRequest,
        api_key: &str,
        timeout: Duration,
    ) -> Result<ProviderResponse, GatewayError>;

    /// A cheap credential probe used by provider-config registration/health checks — not on the
    /// hot path.
    async fn test_credentials(&self, api_key: &str) -> Result<(), GatewayError>;
}

/// Shared helper: classify a non-2xx HTTP status the way every adapter must, per §4.C's failure
/// taxonomy. `provider` names the upstream for the error message; `body` is the raw response text
/// (never echoed back to the client verbatim, only logged/used for message construction here).
pub(crate) fn classify_http_status(provider: &str, status: u16, body: &str) -> GatewayError {
    match status {
        401 | 403 => GatewayError::ProviderAuthFailed {
            provider: provider.to_string(),
            message: truncate(body),
        },
        429 => GatewayError::RateLimited {
            window: modelgate_core::RateWindow::Minute,
            retry_after_secs: 1,
        },
        500..=599 => GatewayError::ProviderTransient {
            provider: provider.to_string(),
            message: format!("http {status}: {}", truncate(body)),
        },
        _ => GatewayError::ProviderBadRequest {
            provider: provider.to_string(),
            message: format!("http {status}: {}", truncate(body)),
        },
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(500).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_statuses_classify_as_provider_auth() {
        for status in [401, 403] {
            let err = classify_http_status("openai", status, "denied");
            assert!(matches!(err, GatewayError::ProviderAuthFailed { .. }));
        }
    }

    #[test]
    fn server_errors_classify_as_transient() {
        let err = classify_http_status("openai", 503, "unavailable");
        assert!(matches!(err, GatewayError::ProviderTransient { .. }));
    }

    #[test]
    fn rate_limit_classifies_as_rate_limited() {
        let err = classify_http_status("openai", 429, "slow down");
        assert!(matches!(err, GatewayError::RateLimited { .. }));
    }

    #[test]
    fn other_4xx_classifies_as_bad_request() {
        let err = classify_http_status("openai", 400, "bad model");
        assert!(matches!(err, GatewayError::ProviderBadRequest { .. }));
    }
}
