//! Model selection, per SPEC_FULL.md §4.F step 2.

use modelgate_core::pricing::MODEL_PROFILES;
use modelgate_core::{Complexity, GatewayError, ModelProfile, OptimizeFor, ProviderKind, RoutingAlternative, RoutingDecision};
use std::collections::HashSet;

/// Crude proxy for "expected cost": split an assumed total token budget evenly across input and
/// output, since the static routing table carries no per-request token estimate of its own.
fn expected_cost(profile: &ModelProfile, assumed_total_tokens: u64) -> f64 {
    let half = assumed_total_tokens as f64 / 2.0;
    (half / 1000.0) * profile.cost_per_1k_input + (half / 1000.0) * profile.cost_per_1k_output
}

fn matches_base(profile: &ModelProfile, enabled: &HashSet<ProviderKind>) -> bool {
    enabled.contains(&profile.provider)
}

fn matches_latency(profile: &ModelProfile, max_latency_ms: Option<u32>) -> bool {
    max_latency_ms.map(|max| profile.typical_latency_ms <= max).unwrap_or(true)
}

fn matches_complexity(profile: &ModelProfile, complexity: Complexity) -> bool {
    profile.suitable_complexities.contains(&complexity)
}

/// Applies §4.F step 2's filter/relax ladder, returning the final candidate set plus a tag of
/// which relaxation stage produced it (used to phrase `rationale`).
fn filtered_candidates<'a>(
    complexity: Complexity,
    max_latency_ms: Option<u32>,
    enabled: &HashSet<ProviderKind>,
) -> (Vec<&'a ModelProfile>, &'static str) {
    let strict: Vec<&ModelProfile> = MODEL_PROFILES
        .iter()
        .filter(|p| matches_base(p, enabled) && matches_complexity(p, complexity) && matches_latency(p, max_latency_ms))
        .collect();
    if !strict.is_empty() {
        return (strict, "matched provider, complexity, and latency constraints");
    }

    let latency_relaxed: Vec<&ModelProfile> = MODEL_PROFILES
        .iter()
        .filter(|p| matches_base(p, enabled) && matches_complexity(p, complexity))
        .collect();
    if !latency_relaxed.is_empty() {
        return (latency_relaxed, "relaxed the latency constraint");
    }

    let provider_only: Vec<&ModelProfile> = MODEL_PROFILES.iter().filter(|p| matches_base(p, enabled)).collect();
    if provider_only.is_empty() {
        return (provider_only, "no enabled provider has any candidate model");
    }

    (provider_only, "relaxed the latency and suitability constraints, chose the cheapest candidate")
}

fn score(profile: &ModelProfile, optimize_for: OptimizeFor, assumed_total_tokens: u64) -> f64 {
    match optimize_for {
        OptimizeFor::Cost => -expected_cost(profile, assumed_total_tokens),
        OptimizeFor::Latency => -(profile.typical_latency_ms as f64),
        OptimizeFor::Quality => profile.quality_score as f64,
    }
}

/// Deterministic tie-break: quality desc, then cost asc, then alphabetical model id.
fn tie_break_key(profile: &ModelProfile, assumed_total_tokens: u64) -> (std::cmp::Reverse<i64>, i64, String) {
    let quality_millis = (profile.quality_score * 1000.0).round() as i64;
    let cost_millis = (expected_cost(profile, assumed_total_tokens) * 1_000_000.0).round() as i64;
    (std::cmp::Reverse(quality_millis), cost_millis, profile.model.clone())
}

pub fn select(
    complexity: Complexity,
    optimize_for: OptimizeFor,
    max_latency_ms: Option<u32>,
    enabled: &HashSet<ProviderKind>,
    assumed_total_tokens: u64,
) -> Result<RoutingDecision, GatewayError> {
    let (candidates, relaxation_note) = filtered_candidates(complexity, max_latency_ms, enabled);
    if candidates.is_empty() {
        return Err(GatewayError::RouterNoCandidate { model: format!("{complexity:?}") });
    }

    let mut ranked: Vec<&ModelProfile> = candidates;
    ranked.sort_by(|a, b| {
        let score_a = score(a, optimize_for, assumed_total_tokens);
        let score_b = score(b, optimize_for, assumed_total_tokens);
        score_b
            .partial_cmp(&score_a)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| tie_break_key(a, assumed_total_tokens).cmp(&tie_break_key(b, assumed_total_tokens)))
    });

    let chosen = ranked[0];
    let alternatives: Vec<RoutingAlternative> = ranked
        .iter()
        .skip(1)
        .take(3)
        .map(|p| RoutingAlternative {
            model: p.model.clone(),
            provider: p.provider,
            reason_not_selected: reason_not_selected(chosen, p, optimize_for, assumed_total_tokens),
        })
        .collect();

    let rationale = format!(
        "chose {} ({}) optimizing for {optimize_for:?}; {relaxation_note}",
        chosen.model, chosen.provider
    );

    Ok(RoutingDecision {
        complexity,
        optimize_for,
        chosen_model: chosen.model.clone(),
        chosen_provider: chosen.provider,
        rationale,
        alternatives,
    })
}

fn reason_not_selected(
    chosen: &ModelProfile,
    candidate: &ModelProfile,
    optimize_for: OptimizeFor,
    assumed_total_tokens: u64,
) -> String {
    match optimize_for {
        OptimizeFor::Cost => format!(
            "higher expected cost (${:.5} vs ${:.5})",
            expected_cost(candidate, assumed_total_tokens),
            expected_cost(chosen, assumed_total_tokens)
        ),
        OptimizeFor::Latency => {
            format!("higher typical latency ({}ms vs {}ms)", candidate.typical_latency_ms, chosen.typical_latency_ms)
        }
        OptimizeFor::Quality => {
            format!("lower quality score ({:.2} vs {:.2})", candidate.quality_score, chosen.quality_score)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_providers() -> HashSet<ProviderKind> {
        [ProviderKind::OpenAi, ProviderKind::Anthropic, ProviderKind::Mistral, ProviderKind::Groq, ProviderKind::Google]
            .into_iter()
            .collect()
    }

    #[test]
    fn cost_optimized_simple_complexity_picks_cheapest_suitable_model() {
        let decision = select(Complexity::Simple, OptimizeFor::Cost, None, &all_providers(), 300).unwrap();
        assert_eq!(decision.chosen_model, "gemini-1.5-flash");
    }

    #[test]
    fn quality_optimized_complex_picks_highest_quality_model() {
        let decision = select(Complexity::Complex, OptimizeFor::Quality, None, &all_providers(), 2000).unwrap();
        assert_eq!(decision.chosen_model, "claude-opus-4-20250514");
    }

    #[test]
    fn no_enabled_provider_returns_no_candidate_error() {
        let enabled = HashSet::new();
        let result = select(Complexity::Simple, OptimizeFor::Cost, None, &enabled, 100);
        assert!(matches!(result, Err(GatewayError::RouterNoCandidate { .. })));
    }

    #[test]
    fn single_eligible_candidate_has_no_alternatives() {
        let mut enabled = HashSet::new();
        enabled.insert(ProviderKind::Groq);
        let decision = select(Complexity::Complex, OptimizeFor::Cost, Some(1000), &enabled, 300).unwrap();
        assert_eq!(decision.chosen_model, "llama-3.3-70b-versatile");
        assert!(decision.alternatives.is_empty());
    }

    #[test]
    fn selection_is_deterministic_across_repeated_calls() {
        let a = select(Complexity::Medium, OptimizeFor::Cost, None, &all_providers(), 400).unwrap();
        let b = select(Complexity::Medium, OptimizeFor::Cost, None, &all_providers(), 400).unwrap();
        assert_eq!(a.chosen_model, b.chosen_model);
        assert_eq!(a.alternatives.len(), b.alternatives.len());
    }
}
