//! Builds the five provider adapters once at process start around one shared `reqwest::Client`.
//!
//! Grounded on `adk-gemini/src/builder.rs`'s builder-then-build pattern, simplified: there is no
//! per-adapter customization to expose, just a single process-wide timeout floor and TLS config.

use crate::adapters::{AnthropicAdapter, GoogleAdapter, OpenAiAdapter, OpenAiCompatibleAdapter};
use crate::client::ProviderClient;
use modelgate_core::{GatewayError, ProviderKind};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ProviderRegistryConfig {
    /// Floor applied to `reqwest::Client`'s own connect/request timeout. Per-call deadlines
    /// passed to `chat_complete` are still the authority for any individual request.
    pub connect_timeout: Duration,
    pub pool_idle_timeout: Duration,
}

impl Default for ProviderRegistryConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            pool_idle_timeout: Duration::from_secs(90),
        }
    }
}

/// Holds one adapter per `ProviderKind`, all sharing one connection-pooled HTTP client.
pub struct ProviderRegistry {
    adapters: HashMap<ProviderKind, Arc<dyn ProviderClient>>,
}

impl ProviderRegistry {
    pub fn new(config: ProviderRegistryConfig) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .build()
            .map_err(|e| GatewayError::Internal(format!("failed to build http client: {e}")))?;

        let mut adapters: HashMap<ProviderKind, Arc<dyn ProviderClient>> = HashMap::new();
        adapters.insert(ProviderKind::OpenAi, Arc::new(OpenAiAdapter::new(http.clone())));
        adapters.insert(ProviderKind::Anthropic, Arc::new(AnthropicAdapter::new(http.clone())));
        adapters.insert(ProviderKind::Google, Arc::new(GoogleAdapter::new(http.clone())));
        adapters.insert(ProviderKind::Mistral, Arc::new(OpenAiCompatibleAdapter::mistral(http.clone())));
        adapters.insert(ProviderKind::Groq, Arc::new(OpenAiCompatibleAdapter::groq(http)));

        Ok(Self { adapters })
    }

    pub fn get(&self, kind: ProviderKind) -> Option<Arc<dyn ProviderClient>> {
        self.adapters.get(&kind).cloned()
    }

    /// Finds the adapter for `kind` and confirms it declares support for `model`, the check the
    /// pipeline's provider-config filtering step needs before it hands off a candidate.
    pub fn adapter_for(&self, kind: ProviderKind, model: &str) -> Option<Arc<dyn ProviderClient>> {
        self.get(kind).filter(|adapter| adapter.supports(model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_all_five_providers() {
        let registry = ProviderRegistry::new(ProviderRegistryConfig::default()).unwrap();
        for kind in [
            ProviderKind::OpenAi,
            ProviderKind::Anthropic,
            ProviderKind::Google,
            ProviderKind::Mistral,
            ProviderKind::Groq,
        ] {
            assert!(registry.get(kind).is_some());
        }
    }

    #[test]
    fn adapter_for_rejects_unsupported_model() {
        let registry = ProviderRegistry::new(ProviderRegistryConfig::default()).unwrap();
        assert!(registry.adapter_for(ProviderKind::OpenAi, "claude-sonnet-4").is_none());
        assert!(registry.adapter_for(ProviderKind::OpenAi, "gpt-4o").is_some());
    }
}
