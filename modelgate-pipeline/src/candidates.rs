//! Builds the ordered failover candidate list for one request, per SPEC_FULL.md §4.G step 4:
//! enabled provider configs, already priority-ordered by the store query, filtered down to the
//! ones whose adapter actually declares support for the target model.

use modelgate_core::ProviderConfig;
use modelgate_providers::{ProviderClient, ProviderRegistry};
use std::sync::Arc;

pub struct Candidate {
    pub config: ProviderConfig,
    pub adapter: Arc<dyn ProviderClient>,
}

pub fn build_candidates(configs: Vec<ProviderConfig>, registry: &ProviderRegistry, model: &str) -> Vec<Candidate> {
    configs
        .into_iter()
        .filter(|c| c.enabled)
        .filter_map(|c| registry.adapter_for(c.provider, model).map(|adapter| Candidate { config: c, adapter }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelgate_core::{ProviderConfigId, ProviderKind, TenantId};
    use modelgate_providers::ProviderRegistryConfig;

    fn config(provider: ProviderKind, enabled: bool, priority: u32) -> ProviderConfig {
        ProviderConfig {
            id: ProviderConfigId::new(),
            tenant_id: TenantId::new(),
            provider,
            api_key_encrypted: "ct".to_string(),
            priority,
            enabled,
        }
    }

    #[test]
    fn disabled_configs_are_excluded() {
        let registry = ProviderRegistry::new(ProviderRegistryConfig::default()).unwrap();
        let configs = vec![config(ProviderKind::OpenAi, false, 0), config(ProviderKind::Anthropic, true, 1)];
        let candidates = build_candidates(configs, &registry, "claude-sonnet-4-20250514");
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].config.provider, ProviderKind::Anthropic);
    }

    #[test]
    fn configs_whose_adapter_does_not_support_the_model_are_excluded() {
        let registry = ProviderRegistry::new(ProviderRegistryConfig::default()).unwrap();
        let configs = vec![config(ProviderKind::OpenAi, true, 0)];
        let candidates = build_candidates(configs, &registry, "claude-sonnet-4-20250514");
        assert!(candidates.is_empty());
    }

    #[test]
    fn preserves_priority_order() {
        let registry = ProviderRegistry::new(ProviderRegistryConfig::default()).unwrap();
        let configs = vec![config(ProviderKind::Mistral, true, 0), config(ProviderKind::Groq, true, 1)];
        let candidates = build_candidates(configs, &registry, "llama-3.3-70b-versatile");
        // Only Groq supports llama models; Mistral is filtered out regardless of priority.
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].config.provider, ProviderKind::Groq);
    }
}
