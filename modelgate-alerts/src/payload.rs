//! The normalized shape every dispatcher renders into its own wire format.

use crate::thresholds::ThresholdKind;
use chrono::{DateTime, Utc};
use modelgate_core::TenantId;

/// One threshold crossing (or the daily-summary job's lower-severity report), normalized before
/// any channel-specific rendering. `current`/`limit` are dollars for the two cost kinds, a
/// fraction in `[0, 1]` for `RateLimitFraction`, and a hit-rate fraction for `CacheHitFloor`.
#[derive(Debug, Clone)]
pub struct NotificationPayload {
    pub tenant_id: TenantId,
    pub kind: ThresholdKind,
    pub current: f64,
    pub limit: f64,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    /// `true` for the daily-summary job's end-of-day report, which dispatches even when no
    /// threshold was crossed — kept separate from `kind` so dispatchers can pick a lower severity.
    pub is_summary: bool,
}

impl NotificationPayload {
    pub fn message(&self) -> String {
        if self.is_summary {
            return format!(
                "tenant {} daily summary for {}: ${:.2} spent, {:.0}% cache hit rate",
                self.tenant_id,
                self.window_start.date_naive(),
                self.current,
                self.limit * 100.0
            );
        }
        match self.kind {
            ThresholdKind::DailyCost => format!(
                "tenant {} exceeded its daily spend threshold: ${:.2} spent against a ${:.2} limit (window starting {})",
                self.tenant_id, self.current, self.limit, self.window_start
            ),
            ThresholdKind::MonthlyCost => format!(
                "tenant {} exceeded its monthly spend threshold: ${:.2} spent against a ${:.2} limit (window starting {})",
                self.tenant_id, self.current, self.limit, self.window_start
            ),
            ThresholdKind::RateLimitFraction => format!(
                "tenant {} consumed {:.0}% of its rate limit, at or above the {:.0}% threshold (window starting {})",
                self.tenant_id,
                self.current * 100.0,
                self.limit * 100.0,
                self.window_start
            ),
            ThresholdKind::CacheHitFloor => format!(
                "tenant {} cache hit rate fell to {:.0}%, below the {:.0}% floor (window starting {})",
                self.tenant_id,
                self.current * 100.0,
                self.limit * 100.0,
                self.window_start
            ),
        }
    }

    /// Whether `current` breaches `limit` the direction `kind` cares about — a ceiling for cost
    /// and rate-limit-fraction thresholds, a floor for cache-hit-rate.
    pub fn breaches(kind: ThresholdKind, current: f64, limit: f64) -> bool {
        match kind {
            ThresholdKind::DailyCost | ThresholdKind::MonthlyCost | ThresholdKind::RateLimitFraction => {
                current >= limit
            }
            ThresholdKind::CacheHitFloor => current < limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_thresholds_breach_at_or_above_limit() {
        assert!(NotificationPayload::breaches(ThresholdKind::DailyCost, 1.0, 1.0));
        assert!(!NotificationPayload::breaches(ThresholdKind::DailyCost, 0.99, 1.0));
    }

    #[test]
    fn cache_hit_floor_breaches_strictly_below_limit() {
        assert!(NotificationPayload::breaches(ThresholdKind::CacheHitFloor, 0.1, 0.2));
        assert!(!NotificationPayload::breaches(ThresholdKind::CacheHitFloor, 0.2, 0.2));
    }
}
