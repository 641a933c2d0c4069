//! Usage ledger: append-only writes plus the windowed reads `/analytics/*` and the alert
//! evaluator consult, per SPEC_FULL.md §4.H. Grounded on `adk-runner/src/cache.rs`'s pattern of
//! wrapping a durable backend with in-process aggregation and a background maintenance task.

mod retry;
mod windows;

pub use retry::{RetryQueue, run as run_retry_queue};

use modelgate_core::{GatewayError, ProviderKind, TenantId, UsageRecord};
use modelgate_store::Store;
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ModelBreakdown {
    pub model: String,
    pub provider: ProviderKind,
    pub requests: i64,
    pub prompt_tokens: i64,
    pub completion_tokens: i64,
    pub cost_usd: f64,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CacheRecommendation {
    pub fingerprint: String,
    pub model: String,
    pub occurrences: i64,
    pub total_cost_usd: f64,
    /// Cost that would have been avoided had every occurrence after the first been a cache hit.
    pub estimated_savings_usd: f64,
}

/// Wraps `modelgate_store`'s usage-log queries with best-effort writes and windowed reads.
#[derive(Clone)]
pub struct Ledger {
    store: Store,
    retry_queue: Arc<RetryQueue>,
}

impl Ledger {
    pub fn new(store: Store) -> Self {
        Self { store, retry_queue: Arc::new(RetryQueue::new()) }
    }

    pub fn retry_queue(&self) -> Arc<RetryQueue> {
        self.retry_queue.clone()
    }

    pub fn store(&self) -> Store {
        self.store.clone()
    }

    /// Never fails the caller: a write failure is logged and the record is queued for retry.
    pub async fn record(&self, record: UsageRecord) {
        if let Err(e) = self.store.insert_usage_record(&record).await {
            warn!(tenant = %record.tenant_id, error = %e, "usage log write failed, queued for retry");
            self.retry_queue.push(record);
        }
    }

    pub async fn day_spend(&self, tenant_id: TenantId, at: chrono::DateTime<chrono::Utc>) -> Result<f64, GatewayError> {
        let (since, until) = windows::day_bounds(at);
        Ok(self.store.spend_in_window(*tenant_id, since, until).await?.total_cost)
    }

    pub async fn month_spend(&self, tenant_id: TenantId, at: chrono::DateTime<chrono::Utc>) -> Result<f64, GatewayError> {
        let (since, until) = windows::month_bounds(at);
        Ok(self.store.spend_in_window(*tenant_id, since, until).await?.total_cost)
    }

    pub async fn cache_hit_rate(
        &self,
        tenant_id: TenantId,
        since: chrono::DateTime<chrono::Utc>,
        until: chrono::DateTime<chrono::Utc>,
    ) -> Result<f64, GatewayError> {
        self.store.cache_hit_rate_in_window(*tenant_id, since, until).await
    }

    pub async fn usage_breakdown(
        &self,
        tenant_id: TenantId,
        since: chrono::DateTime<chrono::Utc>,
    ) -> Result<Vec<ModelBreakdown>, GatewayError> {
        let rows = self.store.usage_by_model(*tenant_id, since).await?;
        let mut breakdown: std::collections::HashMap<(String, String), ModelBreakdown> = std::collections::HashMap::new();
        for row in rows {
            let provider: ProviderKind = row.provider.parse().map_err(GatewayError::StoreError)?;
            let entry = breakdown.entry((row.model.clone(), row.provider.clone())).or_insert_with(|| ModelBreakdown {
                model: row.model.clone(),
                provider,
                requests: 0,
                prompt_tokens: 0,
                completion_tokens: 0,
                cost_usd: 0.0,
            });
            entry.requests += 1;
            entry.prompt_tokens += row.prompt_tokens;
            entry.completion_tokens += row.completion_tokens;
            entry.cost_usd += row.cost;
        }
        let mut out: Vec<ModelBreakdown> = breakdown.into_values().collect();
        out.sort_by(|a, b| b.cost_usd.partial_cmp(&a.cost_usd).unwrap_or(std::cmp::Ordering::Equal));
        Ok(out)
    }

    pub async fn recommendations(&self, tenant_id: TenantId, limit: i64) -> Result<Vec<CacheRecommendation>, GatewayError> {
        let rows = self.store.top_duplicate_fingerprints(*tenant_id, limit).await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let per_call = row.total_cost / row.occurrences as f64;
                let estimated_savings_usd = per_call * (row.occurrences - 1) as f64;
                CacheRecommendation {
                    fingerprint: row.fingerprint,
                    model: row.model,
                    occurrences: row.occurrences,
                    total_cost_usd: row.total_cost,
                    estimated_savings_usd,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recommendations_estimate_savings_from_all_but_first_occurrence() {
        let row_cost = 0.03;
        let occurrences = 3;
        let per_call = row_cost / occurrences as f64;
        let estimated_savings_usd = per_call * (occurrences - 1) as f64;
        assert!((estimated_savings_usd - 0.02).abs() < 1e-9);
    }
}
