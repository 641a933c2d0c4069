//! Request orchestration, per SPEC_FULL.md §4.G: rate limit, cache, optional smart routing,
//! provider failover, ledger write, cache fill — one cancellable call per request.
//!
//! Grounded on `adk-runner/src/runner.rs`'s orchestration shape (a single entry point threading a
//! cancellation signal through a sequence of fallible stages) simplified to a non-streaming,
//! `Result`-returning `async fn`: streaming responses are out of scope here (SPEC_FULL.md §1).

mod candidates;

use candidates::build_candidates;
use chrono::Utc;
use modelgate_cache::{CacheLookup, TwoTierCache};
use modelgate_core::{
    ChatCompletionRequest, ChatCompletionResponse, GatewayError, OptimizeFor, ProviderKind,
    RateWindowUsage, ResponseMeta, RoutingDecision, TenantId, Usage, UsageRecord, pricing,
};
use modelgate_ledger::Ledger;
use modelgate_providers::{ProviderKeyCipher, ProviderRegistry};
use modelgate_ratelimit::{RateLimitOutcome, RateLimiter};
use modelgate_store::Store;
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy)]
pub struct SmartParams {
    pub optimize_for: OptimizeFor,
    pub max_latency_ms: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub provider_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { provider_timeout: Duration::from_secs(30) }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub response: ChatCompletionResponse,
    pub rate_usage: Vec<RateWindowUsage>,
}

/// `error` carries the classified failure; `rate_usage` is attached whenever rate-limit headers
/// should still be rendered on the error response (everything past the rate-limit check).
#[derive(Debug)]
pub struct PipelineError {
    pub error: GatewayError,
    pub rate_usage: Vec<RateWindowUsage>,
}

impl PipelineError {
    fn new(error: GatewayError, rate_usage: Vec<RateWindowUsage>) -> Self {
        Self { error, rate_usage }
    }
}

pub struct Pipeline {
    cache: TwoTierCache,
    rate_limiter: RateLimiter,
    registry: ProviderRegistry,
    store: Store,
    ledger: Ledger,
    cipher: ProviderKeyCipher,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(
        cache: TwoTierCache,
        rate_limiter: RateLimiter,
        registry: ProviderRegistry,
        store: Store,
        ledger: Ledger,
        cipher: ProviderKeyCipher,
        config: PipelineConfig,
    ) -> Self {
        Self { cache, rate_limiter, registry, store, ledger, cipher, config }
    }

    pub async fn complete(
        &self,
        tenant_id: TenantId,
        mut request: ChatCompletionRequest,
        smart: Option<SmartParams>,
        cancellation: CancellationToken,
    ) -> Result<PipelineOutcome, PipelineError> {
        if cancellation.is_cancelled() {
            return Err(PipelineError::new(GatewayError::Cancelled, Vec::new()));
        }

        let rate_outcome = self.rate_limiter.check(tenant_id).await;
        let rate_usage = match rate_outcome {
            RateLimitOutcome::Allowed(usage) => usage,
            RateLimitOutcome::Denied { window, retry_after_secs, usage } => {
                return Err(PipelineError::new(GatewayError::RateLimited { window, retry_after_secs }, usage));
            }
        };

        let mut routing_decision: Option<RoutingDecision> = None;
        if let Some(params) = smart {
            let enabled = self.enabled_provider_kinds(tenant_id, &rate_usage).await?;
            let decision = modelgate_router::route(&request.messages, params.optimize_for, params.max_latency_ms, &enabled)
                .map_err(|e| PipelineError::new(e, rate_usage.clone()))?;
            request.model = decision.chosen_model.clone();
            routing_decision = Some(decision);
        }

        let fingerprint = modelgate_cache::fingerprint(&request);

        if cancellation.is_cancelled() {
            return Err(PipelineError::new(GatewayError::Cancelled, rate_usage));
        }

        match self.cache.lookup(tenant_id, &fingerprint).await {
            CacheLookup::Hit { mut response, source } => {
                response.modelgate.cached = source;
                response.modelgate.routing = routing_decision.clone();
                response.modelgate.cost_usd = 0.0;
                response.usage.cost_usd = 0.0;
                let record = UsageRecord {
                    id: Uuid::new_v4(),
                    tenant_id,
                    ts: Utc::now(),
                    model: response.model.clone(),
                    provider: response.modelgate.provider,
                    prompt_tokens: 0,
                    completion_tokens: 0,
                    cost_usd: 0.0,
                    latency_ms: 0,
                    cache_source: source,
                    fingerprint: fingerprint.to_string(),
                    routing_decision: routing_decision.clone(),
                };
                self.ledger.record(record).await;
                info!(tenant = %tenant_id, %fingerprint, "served from cache");
                return Ok(PipelineOutcome { response, rate_usage });
            }
            CacheLookup::Miss => {}
        }

        let configs = self
            .store
            .list_provider_configs(*tenant_id)
            .await
            .map_err(|e| PipelineError::new(e, rate_usage.clone()))?
            .into_iter()
            .map(|row| row.into_domain())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| PipelineError::new(e, rate_usage.clone()))?;

        let candidates = build_candidates(configs, &self.registry, &request.model);
        if candidates.is_empty() {
            return Err(PipelineError::new(
                GatewayError::AllProvidersExhausted {
                    attempted: 0,
                    last_error: format!("no enabled provider config supports model '{}'", request.model),
                },
                rate_usage,
            ));
        }

        let mut last_error = String::new();
        let mut attempted = 0usize;

        for candidate in &candidates {
            if cancellation.is_cancelled() {
                return Err(PipelineError::new(GatewayError::Cancelled, rate_usage));
            }
            attempted += 1;

            let api_key = match self.cipher.decrypt(&candidate.config.api_key_encrypted) {
                Ok(key) => key,
                Err(e) => {
                    warn!(tenant = %tenant_id, provider = %candidate.config.provider, error = %e, "failed to decrypt provider credential");
                    last_error = e.to_string();
                    continue;
                }
            };

            let started = Instant::now();
            let call = self.registry_chat_complete(candidate, &request, &api_key);

            let outcome = tokio::select! {
                biased;
                _ = cancellation.cancelled() => {
                    return Err(PipelineError::new(GatewayError::Cancelled, rate_usage));
                }
                result = call => result,
            };

            match outcome {
                Ok(provider_response) => {
                    let latency_ms = started.elapsed().as_millis() as u64;
                    let cost_usd = pricing::cost_usd(
                        candidate.config.provider,
                        &provider_response.model,
                        provider_response.prompt_tokens,
                        provider_response.completion_tokens,
                    );

                    let response = ChatCompletionResponse {
                        id: Uuid::new_v4().to_string(),
                        model: provider_response.model.clone(),
                        message: modelgate_core::ChatMessage::assistant(provider_response.content.clone()),
                        usage: Usage {
                            prompt_tokens: provider_response.prompt_tokens,
                            completion_tokens: provider_response.completion_tokens,
                            cost_usd,
                        },
                        modelgate: ResponseMeta {
                            cached: modelgate_core::CacheSource::None,
                            cost_usd,
                            provider: candidate.config.provider,
                            fingerprint: fingerprint.to_string(),
                            routing: routing_decision.clone(),
                        },
                    };

                    let record = UsageRecord {
                        id: Uuid::new_v4(),
                        tenant_id,
                        ts: Utc::now(),
                        model: response.model.clone(),
                        provider: candidate.config.provider,
                        prompt_tokens: provider_response.prompt_tokens,
                        completion_tokens: provider_response.completion_tokens,
                        cost_usd,
                        latency_ms,
                        cache_source: modelgate_core::CacheSource::None,
                        fingerprint: fingerprint.to_string(),
                        routing_decision: routing_decision.clone(),
                    };
                    self.ledger.record(record).await;
                    self.cache.fill(tenant_id, &fingerprint, &response, cost_usd).await;

                    return Ok(PipelineOutcome { response, rate_usage });
                }
                Err(e) => {
                    last_error = e.to_string();
                    if !e.is_recoverable_by_failover() {
                        return Err(PipelineError::new(e, rate_usage));
                    }
                    warn!(tenant = %tenant_id, provider = %candidate.config.provider, error = %last_error, "provider call failed, trying next candidate");
                }
            }
        }

        let record = UsageRecord {
            id: Uuid::new_v4(),
            tenant_id,
            ts: Utc::now(),
            model: request.model.clone(),
            provider: candidates.last().map(|c| c.config.provider).unwrap_or(ProviderKind::OpenAi),
            prompt_tokens: 0,
            completion_tokens: 0,
            cost_usd: 0.0,
            latency_ms: 0,
            cache_source: modelgate_core::CacheSource::None,
            fingerprint: fingerprint.to_string(),
            routing_decision: routing_decision.clone(),
        };
        self.ledger.record(record).await;

        Err(PipelineError::new(GatewayError::AllProvidersExhausted { attempted, last_error }, rate_usage))
    }

    async fn registry_chat_complete(
        &self,
        candidate: &candidates::Candidate,
        request: &ChatCompletionRequest,
        api_key: &str,
    ) -> Result<modelgate_providers::ProviderResponse, GatewayError> {
        candidate.adapter.chat_complete(request, api_key, self.config.provider_timeout).await
    }

    async fn enabled_provider_kinds(
        &self,
        tenant_id: TenantId,
        rate_usage: &[RateWindowUsage],
    ) -> Result<HashSet<ProviderKind>, PipelineError> {
        let configs = self
            .store
            .list_provider_configs(*tenant_id)
            .await
            .map_err(|e| PipelineError::new(e, rate_usage.to_vec()))?;
        Ok(configs
            .into_iter()
            .filter(|c| c.enabled)
            .filter_map(|c| c.provider.parse::<ProviderKind>().ok())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_before_start_short_circuits() {
        let token = CancellationToken::new();
        token.cancel();
        assert!(token.is_cancelled());
    }
}
