//! Fingerprinting plus the two-tier (hot KV / cold Postgres) response cache, per SPEC_FULL.md §4.D.
//!
//! Hot and cold are written independently; cold is authoritative. A hot miss falls through to
//! cold, which on hit is promoted back into hot (write-through). Neither tier blocks the other:
//! if hot is unavailable, lookup degrades to cold-only; if cold is unavailable, lookup degrades
//! to "always miss" and fill becomes best-effort. This crate does not implement singleflight
//! dedup for concurrent identical misses (an explicit open question, see DESIGN.md).

pub mod fingerprint;
mod keys;

pub use fingerprint::fingerprint;

use keys::hot_cache_key;
use modelgate_core::{ChatCompletionRequest, ChatCompletionResponse, Fingerprint, TenantId};
use modelgate_kv::KvStore;
use modelgate_store::{CacheStats, Store};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone)]
pub enum CacheLookup {
    Miss,
    Hit { response: ChatCompletionResponse, source: modelgate_core::CacheSource },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearScope {
    Hot,
    Cold,
    All,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ClearResult {
    pub hot_cleared: u64,
    pub cold_cleared: u64,
}

pub struct TwoTierCache {
    kv: Arc<dyn KvStore>,
    store: Store,
    hot_ttl: Duration,
}

impl TwoTierCache {
    pub fn new(kv: Arc<dyn KvStore>, store: Store, hot_ttl: Duration) -> Self {
        Self { kv, store, hot_ttl }
    }

    pub async fn lookup(
        &self,
        tenant_id: TenantId,
        fingerprint: &Fingerprint,
    ) -> CacheLookup {
        let key = hot_cache_key(tenant_id, fingerprint);

        match self.kv.get(&key).await {
            Ok(Some(json)) => {
                if let Ok(response) = serde_json::from_str::<ChatCompletionResponse>(&json) {
                    return CacheLookup::Hit { response, source: modelgate_core::CacheSource::Hot };
                }
                warn!(tenant = %tenant_id, "hot cache entry failed to deserialize, falling through to cold");
            }
            Ok(None) => {}
            Err(e) => warn!(tenant = %tenant_id, error = %e, "hot cache unavailable, degrading to cold-only lookup"),
        }

        let cold = match self.store.get_cache_cold(*tenant_id, fingerprint.as_ref()).await {
            Ok(row) => row,
            Err(e) => {
                warn!(tenant = %tenant_id, error = %e, "cold cache unavailable, lookup degrades to miss");
                return CacheLookup::Miss;
            }
        };

        match cold {
            Some(row) => match serde_json::from_value::<ChatCompletionResponse>(row.envelope) {
                Ok(response) => {
                    if let Err(e) = self.store.record_cache_hit(*tenant_id, fingerprint.as_ref()).await {
                        warn!(tenant = %tenant_id, error = %e, "failed to record cold cache hit");
                    }
                    if let Ok(json) = serde_json::to_string(&response) {
                        if let Err(e) = self.kv.setex(&key, &json, self.hot_ttl).await {
                            warn!(tenant = %tenant_id, error = %e, "failed to promote cold hit into hot cache");
                        }
                    }
                    CacheLookup::Hit { response, source: modelgate_core::CacheSource::Cold }
                }
                Err(e) => {
                    warn!(tenant = %tenant_id, error = %e, "cold cache entry failed to deserialize");
                    CacheLookup::Miss
                }
            },
            None => CacheLookup::Miss,
        }
    }

    /// `saved_cost_usd` is the cost the upstream call would have incurred had it not been served
    /// from cache — the accumulator §4.D tracks for lifetime-savings reporting.
    pub async fn fill(
        &self,
        tenant_id: TenantId,
        fingerprint: &Fingerprint,
        response: &ChatCompletionResponse,
        saved_cost_usd: f64,
    ) {
        let key = hot_cache_key(tenant_id, fingerprint);
        if let Ok(json) = serde_json::to_string(response) {
            if let Err(e) = self.kv.setex(&key, &json, self.hot_ttl).await {
                warn!(tenant = %tenant_id, error = %e, "hot cache fill failed, continuing with cold-only fill");
            }
        }

        let envelope = match serde_json::to_value(response) {
            Ok(v) => v,
            Err(e) => {
                warn!(tenant = %tenant_id, error = %e, "failed to serialize response for cold cache fill");
                return;
            }
        };
        if let Err(e) = self
            .store
            .upsert_cache_cold(*tenant_id, fingerprint.as_ref(), &envelope, saved_cost_usd)
            .await
        {
            warn!(tenant = %tenant_id, error = %e, "cold cache fill failed");
        }
    }

    pub async fn stats(&self, tenant_id: TenantId) -> Result<CacheStats, modelgate_core::GatewayError> {
        self.store.cache_stats(*tenant_id).await
    }

    pub async fn clear(
        &self,
        tenant_id: TenantId,
        scope: ClearScope,
        pattern: Option<&str>,
    ) -> Result<ClearResult, modelgate_core::GatewayError> {
        let mut result = ClearResult::default();

        if matches!(scope, ClearScope::Hot | ClearScope::All) {
            let prefix = match pattern {
                Some(p) => format!("cache:{tenant_id}:{p}"),
                None => format!("cache:{tenant_id}:"),
            };
            match self.kv.del_prefix(&prefix).await {
                Ok(n) => result.hot_cleared = n,
                Err(e) => warn!(tenant = %tenant_id, error = %e, "hot cache clear failed"),
            }
        }

        if matches!(scope, ClearScope::Cold | ClearScope::All) {
            result.cold_cleared = self.store.clear_cache_cold(*tenant_id, pattern).await?;
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_result_defaults_to_zero() {
        let result = ClearResult::default();
        assert_eq!(result.hot_cleared, 0);
        assert_eq!(result.cold_cleared, 0);
    }

    // lookup()/fill() round trips against a live Store need Postgres; exercised in
    // modelgate-pipeline's integration tests instead.
}
