//! The smart router: rule-based complexity classification plus cost/latency/quality model
//! selection, per SPEC_FULL.md §4.F. Two entry points share this crate's logic: `/v1/smart/completions`
//! runs the decision and hands off to the pipeline as if the client had named the chosen model;
//! `/v1/smart/analyze` runs the same decision without invoking a provider.

mod classify;
mod select;

pub use classify::classify;
pub use modelgate_core::pricing::MODEL_PROFILES;
pub use select::select;

use modelgate_core::{ChatMessage, GatewayError, OptimizeFor, ProviderKind, RoutingDecision};
use std::collections::HashSet;

/// Runs both steps of §4.F: classify the prompt, then select a model among `enabled` providers.
pub fn route(
    messages: &[ChatMessage],
    optimize_for: OptimizeFor,
    max_latency_ms: Option<u32>,
    enabled: &HashSet<ProviderKind>,
) -> Result<RoutingDecision, GatewayError> {
    let complexity = classify::classify(messages);
    let assumed_total_tokens = messages.iter().map(|m| m.content.chars().count() as u64 / 4).sum::<u64>().max(1);
    select::select(complexity, optimize_for, max_latency_ms, enabled, assumed_total_tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_attaches_classified_complexity_to_decision() {
        let messages = vec![ChatMessage::user("classify this")];
        let enabled: HashSet<ProviderKind> = [ProviderKind::Google].into_iter().collect();
        let decision = route(&messages, OptimizeFor::Cost, None, &enabled).unwrap();
        assert_eq!(decision.complexity, modelgate_core::Complexity::Simple);
    }
}
