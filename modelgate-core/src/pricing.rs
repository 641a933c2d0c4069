//! Static, process-wide pricing and routing-characteristics tables.
//!
//! Hard-coded and unversioned (see DESIGN.md open question #3): a `UsageRecord` stores the price
//! actually applied at ingestion time, not a reference back into this table, so changing a price
//! here only affects future requests.

use crate::types::{Complexity, ModelProfile, ProviderKind};
use std::sync::LazyLock;

/// (input $ / 1k tokens, output $ / 1k tokens) for every model ModelGate knows how to route to.
pub static MODEL_PROFILES: LazyLock<Vec<ModelProfile>> = LazyLock::new(|| {
    vec![
        ModelProfile {
            provider: ProviderKind::OpenAi,
            model: "gpt-4o-mini".into(),
            cost_per_1k_input: 0.00015,
            cost_per_1k_output: 0.0006,
            typical_latency_ms: 600,
            quality_score: 0.78,
            suitable_complexities: vec![Complexity::Simple, Complexity::Medium],
        },
        ModelProfile {
            provider: ProviderKind::OpenAi,
            model: "gpt-4o".into(),
            cost_per_1k_input: 0.0025,
            cost_per_1k_output: 0.01,
            typical_latency_ms: 1_400,
            quality_score: 0.93,
            suitable_complexities: vec![Complexity::Medium, Complexity::Complex],
        },
        ModelProfile {
            provider: ProviderKind::Anthropic,
            model: "claude-haiku-4-20250514".into(),
            cost_per_1k_input: 0.00025,
            cost_per_1k_output: 0.00125,
            typical_latency_ms: 550,
            quality_score: 0.75,
            suitable_complexities: vec![Complexity::Simple, Complexity::Medium],
        },
        ModelProfile {
            provider: ProviderKind::Anthropic,
            model: "claude-sonnet-4-20250514".into(),
            cost_per_1k_input: 0.003,
            cost_per_1k_output: 0.015,
            typical_latency_ms: 1_600,
            quality_score: 0.95,
            suitable_complexities: vec![Complexity::Medium, Complexity::Complex],
        },
        ModelProfile {
            provider: ProviderKind::Anthropic,
            model: "claude-opus-4-20250514".into(),
            cost_per_1k_input: 0.015,
            cost_per_1k_output: 0.075,
            typical_latency_ms: 2_800,
            quality_score: 0.98,
            suitable_complexities: vec![Complexity::Complex],
        },
        ModelProfile {
            provider: ProviderKind::Mistral,
            model: "mistral-small-latest".into(),
            cost_per_1k_input: 0.0002,
            cost_per_1k_output: 0.0006,
            typical_latency_ms: 500,
            quality_score: 0.70,
            suitable_complexities: vec![Complexity::Simple, Complexity::Medium],
        },
        ModelProfile {
            provider: ProviderKind::Mistral,
            model: "mistral-large-latest".into(),
            cost_per_1k_input: 0.002,
            cost_per_1k_output: 0.006,
            typical_latency_ms: 1_200,
            quality_score: 0.88,
            suitable_complexities: vec![Complexity::Medium, Complexity::Complex],
        },
        ModelProfile {
            provider: ProviderKind::Groq,
            model: "llama-3.3-70b-versatile".into(),
            cost_per_1k_input: 0.00059,
            cost_per_1k_output: 0.00079,
            typical_latency_ms: 220,
            quality_score: 0.82,
            suitable_complexities: vec![Complexity::Simple, Complexity::Medium, Complexity::Complex],
        },
        ModelProfile {
            provider: ProviderKind::Google,
            model: "gemini-1.5-flash".into(),
            cost_per_1k_input: 0.000075,
            cost_per_1k_output: 0.0003,
            typical_latency_ms: 450,
            quality_score: 0.76,
            suitable_complexities: vec![Complexity::Simple, Complexity::Medium],
        },
        ModelProfile {
            provider: ProviderKind::Google,
            model: "gemini-1.5-pro".into(),
            cost_per_1k_input: 0.00125,
            cost_per_1k_output: 0.005,
            typical_latency_ms: 1_300,
            quality_score: 0.91,
            suitable_complexities: vec![Complexity::Medium, Complexity::Complex],
        },
    ]
});

/// Look up a model's static profile by (provider, model id).
pub fn profile_for(provider: ProviderKind, model: &str) -> Option<&'static ModelProfile> {
    MODEL_PROFILES.iter().find(|p| p.provider == provider && p.model == model)
}

/// Compute cost in USD given token counts, falling back to `0.0` for unknown models — a provider
/// adapter would only report usage for a model it was actually able to call.
pub fn cost_usd(provider: ProviderKind, model: &str, prompt_tokens: u64, completion_tokens: u64) -> f64 {
    match profile_for(provider, model) {
        Some(p) => {
            (prompt_tokens as f64 / 1000.0) * p.cost_per_1k_input
                + (completion_tokens as f64 / 1000.0) * p.cost_per_1k_output
        }
        None => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_is_zero_for_unknown_model() {
        assert_eq!(cost_usd(ProviderKind::OpenAi, "not-a-real-model", 1000, 1000), 0.0);
    }

    #[test]
    fn known_model_cost_scales_linearly_with_tokens() {
        let one_k = cost_usd(ProviderKind::OpenAi, "gpt-4o-mini", 1000, 0);
        let two_k = cost_usd(ProviderKind::OpenAi, "gpt-4o-mini", 2000, 0);
        assert!((two_k - 2.0 * one_k).abs() < 1e-9);
    }
}
