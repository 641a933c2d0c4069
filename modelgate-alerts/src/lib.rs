//! Periodic alert evaluation and multi-channel dispatch, per SPEC_FULL.md §4.I/§4.J.
//!
//! Grounded on `modelgate-ledger::retry::run`'s shape: an explicit `tokio::time::interval` loop
//! selected against a `CancellationToken`, replacing the source system's library-scheduler
//! singleton (DESIGN.md's "cross-file mutable singletons" redesign note). One `Evaluator::tick`
//! call evaluates every tenant with an `AlertConfig` once; `Evaluator::run` drives it forever.

pub mod dispatch;
pub mod payload;
pub mod thresholds;

pub use dispatch::{DispatchError, EmailDispatcher, NotificationDispatcher, SlackDispatcher, SmtpSettings, WebhookDispatcher};
pub use payload::NotificationPayload;
pub use thresholds::{AlertThresholds, LastFired, ThresholdKind};

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use modelgate_core::{AlertChannelKind, GatewayError, TenantId};
use modelgate_ledger::Ledger;
use modelgate_ratelimit::RateLimiter;
use modelgate_store::Store;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Bounded exponential backoff for a single channel's delivery attempt within one tick, per
/// §4.J's "retried with bounded exponential backoff up to a fixed cap".
const MAX_DISPATCH_ATTEMPTS: u32 = 3;
const BACKOFF_BASE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct EvaluatorConfig {
    /// Wall-clock period between evaluator ticks. Design default: 60 minutes (§4.I).
    pub tick_interval: Duration,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self { tick_interval: Duration::from_secs(60 * 60) }
    }
}

pub struct Evaluator {
    store: Store,
    ledger: Ledger,
    rate_limiter: RateLimiter,
    dispatchers: HashMap<AlertChannelKind, Arc<dyn NotificationDispatcher>>,
    config: EvaluatorConfig,
}

impl Evaluator {
    pub fn new(
        store: Store,
        ledger: Ledger,
        rate_limiter: RateLimiter,
        dispatchers: HashMap<AlertChannelKind, Arc<dyn NotificationDispatcher>>,
        config: EvaluatorConfig,
    ) -> Self {
        Self { store, ledger, rate_limiter, dispatchers, config }
    }

    /// Runs until `shutdown` fires. The first tick runs immediately rather than waiting a full
    /// `tick_interval`, so a freshly started process doesn't leave thresholds unevaluated for an
    /// hour.
    pub async fn run(&self, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval(self.config.tick_interval);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("alert evaluator shutting down");
                    return;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.tick(Utc::now()).await {
                        error!(error = %e, "alert evaluator tick failed");
                    }
                }
            }
        }
    }

    /// One evaluation pass over every tenant with an `alert_configs` row, at wall-clock time
    /// `now` (parameterized for deterministic tests).
    pub async fn tick(&self, now: DateTime<Utc>) -> Result<(), GatewayError> {
        let configs = self.store.list_tenants_with_alert_configs().await?;
        for row in configs {
            let tenant_id = TenantId::from(row.tenant_id);
            let thresholds: AlertThresholds = serde_json::from_value(row.thresholds_json).unwrap_or_default();
            let mut last_fired: LastFired = serde_json::from_value(row.last_fired_json).unwrap_or_default();

            let channels = match self.store.list_alert_channels(row.tenant_id).await {
                Ok(channels) => channels,
                Err(e) => {
                    warn!(tenant = %tenant_id, error = %e, "failed to load alert channels, skipping tenant this tick");
                    continue;
                }
            };
            if channels.is_empty() {
                continue;
            }

            let mut dirty = false;
            dirty |= self.evaluate_thresholds(tenant_id, &thresholds, &mut last_fired, &channels, now).await;
            dirty |= self.evaluate_daily_summary(tenant_id, &mut last_fired, &channels, now).await;

            if dirty {
                if let Ok(json) = serde_json::to_value(&last_fired) {
                    if let Err(e) = self.store.update_last_fired(row.tenant_id, json).await {
                        warn!(tenant = %tenant_id, error = %e, "failed to persist alert last-fired state");
                    }
                }
            }
        }
        Ok(())
    }

    async fn evaluate_thresholds(
        &self,
        tenant_id: TenantId,
        thresholds: &AlertThresholds,
        last_fired: &mut LastFired,
        channels: &[modelgate_store::AlertChannelRow],
        now: DateTime<Utc>,
    ) -> bool {
        let day_start = day_start(now);
        let month_start = month_start(now);
        let mut dirty = false;

        if let Some(limit) = thresholds.daily_cost_usd {
            if !last_fired.already_fired_for(ThresholdKind::DailyCost, day_start) {
                match self.ledger.day_spend(tenant_id, now).await {
                    Ok(current) => {
                        dirty |= self
                            .fire_if_breached(tenant_id, ThresholdKind::DailyCost, last_fired, channels, day_start, now, current, limit)
                            .await;
                    }
                    Err(e) => warn!(tenant = %tenant_id, error = %e, "failed to compute daily spend for alert evaluation"),
                }
            }
        }

        if let Some(limit) = thresholds.monthly_cost_usd {
            if !last_fired.already_fired_for(ThresholdKind::MonthlyCost, month_start) {
                match self.ledger.month_spend(tenant_id, now).await {
                    Ok(current) => {
                        dirty |= self
                            .fire_if_breached(tenant_id, ThresholdKind::MonthlyCost, last_fired, channels, month_start, now, current, limit)
                            .await;
                    }
                    Err(e) => warn!(tenant = %tenant_id, error = %e, "failed to compute monthly spend for alert evaluation"),
                }
            }
        }

        if let Some(limit) = thresholds.rate_limit_fraction {
            if !last_fired.already_fired_for(ThresholdKind::RateLimitFraction, day_start) {
                let usage = self.rate_limiter.usage(tenant_id).await;
                let current = usage
                    .iter()
                    .map(|w| if w.limit == 0 { 0.0 } else { w.used as f64 / w.limit as f64 })
                    .fold(0.0_f64, f64::max);
                dirty |= self
                    .fire_if_breached(tenant_id, ThresholdKind::RateLimitFraction, last_fired, channels, day_start, now, current, limit)
                    .await;
            }
        }

        if let Some(limit) = thresholds.cache_hit_floor {
            if !last_fired.already_fired_for(ThresholdKind::CacheHitFloor, day_start) {
                let until = day_start + ChronoDuration::days(1);
                match self.ledger.cache_hit_rate(tenant_id, day_start, until).await {
                    Ok(current) => {
                        dirty |= self
                            .fire_if_breached(tenant_id, ThresholdKind::CacheHitFloor, last_fired, channels, day_start, now, current, limit)
                            .await;
                    }
                    Err(e) => warn!(tenant = %tenant_id, error = %e, "failed to compute cache hit rate for alert evaluation"),
                }
            }
        }

        dirty
    }

    /// If `current` breaches `limit` in the direction `kind` cares about, dispatch to every
    /// enabled channel and mark `last_fired`. Returns whether `last_fired` was mutated.
    #[allow(clippy::too_many_arguments)]
    async fn fire_if_breached(
        &self,
        tenant_id: TenantId,
        kind: ThresholdKind,
        last_fired: &mut LastFired,
        channels: &[modelgate_store::AlertChannelRow],
        window_start: DateTime<Utc>,
        now: DateTime<Utc>,
        current: f64,
        limit: f64,
    ) -> bool {
        if !NotificationPayload::breaches(kind, current, limit) {
            return false;
        }

        let payload = NotificationPayload {
            tenant_id,
            kind,
            current,
            limit,
            window_start,
            window_end: now,
            is_summary: false,
        };

        if self.dispatch_to_all(channels, &payload).await {
            last_fired.mark_fired(kind, window_start);
            true
        } else {
            false
        }
    }

    async fn evaluate_daily_summary(
        &self,
        tenant_id: TenantId,
        last_fired: &mut LastFired,
        channels: &[modelgate_store::AlertChannelRow],
        now: DateTime<Utc>,
    ) -> bool {
        let yesterday_start = day_start(now) - ChronoDuration::days(1);
        if last_fired.already_sent_summary_for(day_start(now)) {
            return false;
        }

        let spend = match self.ledger.day_spend(tenant_id, yesterday_start).await {
            Ok(v) => v,
            Err(e) => {
                warn!(tenant = %tenant_id, error = %e, "failed to compute daily summary spend");
                return false;
            }
        };
        let hit_rate = self
            .ledger
            .cache_hit_rate(tenant_id, yesterday_start, yesterday_start + ChronoDuration::days(1))
            .await
            .unwrap_or(0.0);

        let payload = NotificationPayload {
            tenant_id,
            kind: ThresholdKind::DailyCost,
            current: spend,
            limit: hit_rate,
            window_start: yesterday_start,
            window_end: now,
            is_summary: true,
        };

        if self.dispatch_to_all(channels, &payload).await {
            last_fired.mark_summary_sent(day_start(now));
            true
        } else {
            false
        }
    }

    /// Dispatches to every enabled channel independently; one channel's exhausted retries never
    /// block another's delivery. Returns `true` if at least one channel succeeded, matching
    /// §4.I step 3's "on successful dispatch to at least one channel, update last-fired".
    async fn dispatch_to_all(&self, channels: &[modelgate_store::AlertChannelRow], payload: &NotificationPayload) -> bool {
        let mut any_succeeded = false;
        for channel in channels {
            if !channel.enabled {
                continue;
            }
            let kind: AlertChannelKind = match channel.kind.as_str() {
                "slack" => AlertChannelKind::Slack,
                "email" => AlertChannelKind::Email,
                "webhook" => AlertChannelKind::Webhook,
                other => {
                    warn!(channel_kind = other, "unknown alert channel kind, skipping");
                    continue;
                }
            };
            let Some(dispatcher) = self.dispatchers.get(&kind) else {
                warn!(?kind, "no dispatcher configured for this channel kind");
                continue;
            };

            let channel_config: modelgate_core::ChannelConfig = match serde_json::from_value(channel.config_json.clone()) {
                Ok(c) => c,
                Err(e) => {
                    warn!(channel_id = %channel.id, error = %e, "malformed channel config, skipping");
                    continue;
                }
            };

            if self.dispatch_with_retry(dispatcher.as_ref(), &channel_config, payload, channel.id).await {
                any_succeeded = true;
            }
        }
        any_succeeded
    }

    async fn dispatch_with_retry(
        &self,
        dispatcher: &dyn NotificationDispatcher,
        config: &modelgate_core::ChannelConfig,
        payload: &NotificationPayload,
        channel_id: Uuid,
    ) -> bool {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match dispatcher.send(config, payload).await {
                Ok(()) => {
                    info!(channel_id = %channel_id, attempt, "alert dispatched");
                    return true;
                }
                Err(e) if e.retriable && attempt < MAX_DISPATCH_ATTEMPTS => {
                    let backoff = BACKOFF_BASE * 2u32.pow(attempt - 1);
                    warn!(channel_id = %channel_id, attempt, error = %e, "dispatch failed, retrying after backoff");
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => {
                    error!(channel_id = %channel_id, attempt, error = %e, retriable = e.retriable, "dispatch exhausted, giving up on this channel");
                    return false;
                }
            }
        }
    }
}

fn day_start(at: DateTime<Utc>) -> DateTime<Utc> {
    at.date_naive().and_hms_opt(0, 0, 0).unwrap().and_utc()
}

fn month_start(at: DateTime<Utc>) -> DateTime<Utc> {
    use chrono::{Datelike, TimeZone};
    Utc.with_ymd_and_hms(at.year(), at.month(), 1, 0, 0, 0).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn day_start_truncates_to_midnight_utc() {
        let at = Utc.with_ymd_and_hms(2026, 3, 15, 14, 30, 0).unwrap();
        let start = day_start(at);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn month_start_truncates_to_first_of_month() {
        let at = Utc.with_ymd_and_hms(2026, 3, 15, 14, 30, 0).unwrap();
        assert_eq!(month_start(at), Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap());
    }
}
