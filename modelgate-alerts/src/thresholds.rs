//! Alert threshold configuration and the last-fired bookkeeping that enforces §4.I's "fires at
//! most once per window" invariant. Stored as the free-form JSON blobs `alert_configs` carries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdKind {
    DailyCost,
    MonthlyCost,
    /// Fraction (0.0-1.0) of a tenant's minute rate limit consumed, sampled once per evaluator
    /// tick and compared against the *current* calendar day window like `DailyCost`.
    RateLimitFraction,
    /// Cache hit-rate floor: fires when the day's hit rate falls *below* the configured value,
    /// the one threshold in this set that is a lower bound rather than a ceiling.
    CacheHitFloor,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertThresholds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_cost_usd: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_cost_usd: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit_fraction: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_hit_floor: Option<f64>,
}

/// The last UTC window-start a threshold already fired for. Reread and rewritten on every
/// evaluator tick that fires, so a crash between fire and write risks at most one duplicate alert
/// rather than silent suppression forever.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LastFired {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_cost: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_cost: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit_fraction: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_hit_floor: Option<DateTime<Utc>>,
    /// Last calendar day the unconditional daily-summary job already ran for this tenant —
    /// tracked separately from the four threshold kinds above since it fires regardless of
    /// whether any threshold was crossed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_summary: Option<DateTime<Utc>>,
}

impl LastFired {
    pub fn already_sent_summary_for(&self, day_start: DateTime<Utc>) -> bool {
        self.daily_summary == Some(day_start)
    }

    pub fn mark_summary_sent(&mut self, day_start: DateTime<Utc>) {
        self.daily_summary = Some(day_start);
    }

    pub fn already_fired_for(&self, kind: ThresholdKind, window_start: DateTime<Utc>) -> bool {
        match kind {
            ThresholdKind::DailyCost => self.daily_cost == Some(window_start),
            ThresholdKind::MonthlyCost => self.monthly_cost == Some(window_start),
            ThresholdKind::RateLimitFraction => self.rate_limit_fraction == Some(window_start),
            ThresholdKind::CacheHitFloor => self.cache_hit_floor == Some(window_start),
        }
    }

    pub fn mark_fired(&mut self, kind: ThresholdKind, window_start: DateTime<Utc>) {
        match kind {
            ThresholdKind::DailyCost => self.daily_cost = Some(window_start),
            ThresholdKind::MonthlyCost => self.monthly_cost = Some(window_start),
            ThresholdKind::RateLimitFraction => self.rate_limit_fraction = Some(window_start),
            ThresholdKind::CacheHitFloor => self.cache_hit_floor = Some(window_start),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn marking_fired_suppresses_repeat_fires_for_the_same_window() {
        let mut last_fired = LastFired::default();
        let window_start = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        assert!(!last_fired.already_fired_for(ThresholdKind::DailyCost, window_start));
        last_fired.mark_fired(ThresholdKind::DailyCost, window_start);
        assert!(last_fired.already_fired_for(ThresholdKind::DailyCost, window_start));
    }

    #[test]
    fn a_new_window_is_not_suppressed_by_a_previous_ones_fire() {
        let mut last_fired = LastFired::default();
        let day_one = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let day_two = Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap();
        last_fired.mark_fired(ThresholdKind::DailyCost, day_one);
        assert!(!last_fired.already_fired_for(ThresholdKind::DailyCost, day_two));
    }
}
