//! Per-tenant minute/hour/day rate limiting, per SPEC_FULL.md §4.E.
//!
//! Fail-open: any KV unavailability during `check` logs a warning and the request is allowed —
//! availability of the serving path outranks strict enforcement (§4.E rationale). Counter
//! increments are atomic via `KvStore::incr_with_expiry`'s single Lua round trip, so two
//! concurrent callers against the same bucket never race on who sets the TTL.

mod buckets;

use buckets::{bucket_key, reset_prefix, seconds_until_window_end, window_str};
use chrono::Utc;
use modelgate_core::{GatewayError, RateLimitConfig, RateWindow, RateWindowUsage, TenantId};
use modelgate_kv::KvStore;
use modelgate_store::Store;
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Clone)]
pub enum RateLimitOutcome {
    Allowed(Vec<RateWindowUsage>),
    Denied { window: RateWindow, retry_after_secs: u64, usage: Vec<RateWindowUsage> },
}

/// Validated update to a tenant's rate limit configuration. `RateLimiter::update_config` rejects
/// values outside §4.E's documented ranges before anything reaches the store.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct RateLimitConfigUpdate {
    pub per_minute: u32,
    pub per_hour: u32,
    pub per_day: u32,
    pub enabled: bool,
}

const PER_MINUTE_RANGE: std::ops::RangeInclusive<u32> = 1..=10_000;
const PER_HOUR_RANGE: std::ops::RangeInclusive<u32> = 1..=1_000_000;
const PER_DAY_RANGE: std::ops::RangeInclusive<u32> = 1..=10_000_000;

pub struct RateLimiter {
    kv: Arc<dyn KvStore>,
    store: Store,
}

impl RateLimiter {
    pub fn new(kv: Arc<dyn KvStore>, store: Store) -> Self {
        Self { kv, store }
    }

    async fn effective_config(&self, tenant_id: TenantId) -> RateLimitConfig {
        match self.store.get_rate_limit_config(*tenant_id).await {
            Ok(Some(row)) => RateLimitConfig {
                per_minute: row.per_minute as u32,
                per_hour: row.per_hour as u32,
                per_day: row.per_day as u32,
                enabled: row.enabled,
            },
            Ok(None) => RateLimitConfig::default(),
            Err(e) => {
                warn!(tenant = %tenant_id, error = %e, "failed to load rate limit config, using defaults");
                RateLimitConfig::default()
            }
        }
    }

    fn limit_for(config: &RateLimitConfig, window: RateWindow) -> u32 {
        match window {
            RateWindow::Minute => config.per_minute,
            RateWindow::Hour => config.per_hour,
            RateWindow::Day => config.per_day,
        }
    }

    /// Executed before any outbound work for a request. Order is fixed: minute, hour, day.
    pub async fn check(&self, tenant_id: TenantId) -> RateLimitOutcome {
        let config = self.effective_config(tenant_id).await;
        if !config.enabled {
            return RateLimitOutcome::Allowed(Vec::new());
        }

        let now = Utc::now();
        let mut usage = Vec::with_capacity(3);

        for window in RateWindow::all() {
            let key = bucket_key(tenant_id, window, now);
            let limit = Self::limit_for(&config, window);
            let ttl = std::time::Duration::from_secs(window.duration_seconds() as u64);

            match self.kv.incr_with_expiry(&key, ttl).await {
                Ok(value) => {
                    let used = value.max(0) as u32;
                    if used > limit {
                        let retry_after_secs = seconds_until_window_end(window, now);
                        return RateLimitOutcome::Denied { window, retry_after_secs, usage };
                    }
                    usage.push(RateWindowUsage { window, used, limit, remaining: limit - used });
                }
                Err(e) => {
                    warn!(tenant = %tenant_id, window = window_str(window), error = %e, "rate limit KV unavailable, failing open");
                    return RateLimitOutcome::Allowed(usage);
                }
            }
        }

        RateLimitOutcome::Allowed(usage)
    }

    /// Read current usage for all three windows without incrementing any counter.
    pub async fn usage(&self, tenant_id: TenantId) -> Vec<RateWindowUsage> {
        let config = self.effective_config(tenant_id).await;
        let now = Utc::now();
        let mut usage = Vec::with_capacity(3);

        for window in RateWindow::all() {
            let key = bucket_key(tenant_id, window, now);
            let limit = Self::limit_for(&config, window);
            let used = match self.kv.get(&key).await {
                Ok(Some(raw)) => raw.parse::<u32>().unwrap_or(0),
                Ok(None) => 0,
                Err(e) => {
                    warn!(tenant = %tenant_id, error = %e, "failed to read rate limit usage");
                    0
                }
            };
            usage.push(RateWindowUsage { window, used, limit, remaining: limit.saturating_sub(used) });
        }

        usage
    }

    pub async fn get_config(&self, tenant_id: TenantId) -> RateLimitConfig {
        self.effective_config(tenant_id).await
    }

    pub fn validate(update: &RateLimitConfigUpdate) -> Result<(), GatewayError> {
        if !PER_MINUTE_RANGE.contains(&update.per_minute) {
            return Err(GatewayError::Validation(format!(
                "per_minute must be in {PER_MINUTE_RANGE:?}, got {}",
                update.per_minute
            )));
        }
        if !PER_HOUR_RANGE.contains(&update.per_hour) {
            return Err(GatewayError::Validation(format!(
                "per_hour must be in {PER_HOUR_RANGE:?}, got {}",
                update.per_hour
            )));
        }
        if !PER_DAY_RANGE.contains(&update.per_day) {
            return Err(GatewayError::Validation(format!(
                "per_day must be in {PER_DAY_RANGE:?}, got {}",
                update.per_day
            )));
        }
        Ok(())
    }

    pub async fn update_config(
        &self,
        tenant_id: TenantId,
        update: RateLimitConfigUpdate,
    ) -> Result<RateLimitConfig, GatewayError> {
        Self::validate(&update)?;
        let row = self
            .store
            .upsert_rate_limit_config(
                *tenant_id,
                update.per_minute as i32,
                update.per_hour as i32,
                update.per_day as i32,
                update.enabled,
            )
            .await?;
        Ok(RateLimitConfig {
            per_minute: row.per_minute as u32,
            per_hour: row.per_hour as u32,
            per_day: row.per_day as u32,
            enabled: row.enabled,
        })
    }

    pub async fn delete_config(&self, tenant_id: TenantId) -> Result<(), GatewayError> {
        self.store.delete_rate_limit_config(*tenant_id).await
    }

    pub async fn reset(&self, tenant_id: TenantId) -> Result<u64, GatewayError> {
        self.kv.del_prefix(&reset_prefix(tenant_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_out_of_range_minute_limit() {
        let update = RateLimitConfigUpdate { per_minute: 0, per_hour: 100, per_day: 100, enabled: true };
        assert!(RateLimiter::validate(&update).is_err());
    }

    #[test]
    fn validate_rejects_day_limit_above_ceiling() {
        let update =
            RateLimitConfigUpdate { per_minute: 10, per_hour: 100, per_day: 20_000_000, enabled: true };
        assert!(RateLimiter::validate(&update).is_err());
    }

    #[test]
    fn validate_accepts_defaults() {
        let default = RateLimitConfig::default();
        let update = RateLimitConfigUpdate {
            per_minute: default.per_minute,
            per_hour: default.per_hour,
            per_day: default.per_day,
            enabled: default.enabled,
        };
        assert!(RateLimiter::validate(&update).is_ok());
    }
}
