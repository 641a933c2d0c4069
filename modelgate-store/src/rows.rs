//! Typed row structs mapped with `sqlx::FromRow`, one per table in `migrations/0001_init.sql`.

use chrono::{DateTime, Utc};
use modelgate_core::{CacheSource, ProviderConfig, ProviderConfigId, ProviderKind, TenantId, UsageRecord};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct TenantRow {
    pub id: Uuid,
    pub name: String,
    pub api_key_digest: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ProviderConfigRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub provider: String,
    pub api_key_encrypted: String,
    pub priority: i32,
    pub enabled: bool,
}

impl ProviderConfigRow {
    /// Parse failure means a row's `provider` column holds a value outside the known
    /// `ProviderKind` set — a data integrity problem, not a recoverable runtime condition.
    pub fn into_domain(self) -> Result<ProviderConfig, modelgate_core::GatewayError> {
        let provider: ProviderKind = self
            .provider
            .parse()
            .map_err(|e: String| modelgate_core::GatewayError::StoreError(e))?;
        Ok(ProviderConfig {
            id: ProviderConfigId::from(Uuid::from(self.id)),
            tenant_id: TenantId::from(self.tenant_id),
            provider,
            api_key_encrypted: self.api_key_encrypted,
            priority: self.priority as u32,
            enabled: self.enabled,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct UsageLogRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub ts: DateTime<Utc>,
    pub model: String,
    pub provider: String,
    pub prompt_tokens: i64,
    pub completion_tokens: i64,
    pub cost: f64,
    pub latency_ms: i64,
    pub cache_source: String,
    pub fingerprint: String,
    pub routing_decision_json: Option<serde_json::Value>,
}

impl UsageLogRow {
    pub fn from_domain(record: &UsageRecord) -> Self {
        Self {
            id: record.id,
            tenant_id: *record.tenant_id,
            ts: record.ts,
            model: record.model.clone(),
            provider: record.provider.as_str().to_string(),
            prompt_tokens: record.prompt_tokens as i64,
            completion_tokens: record.completion_tokens as i64,
            cost: record.cost_usd,
            latency_ms: record.latency_ms as i64,
            cache_source: cache_source_str(record.cache_source).to_string(),
            fingerprint: record.fingerprint.clone(),
            routing_decision_json: record
                .routing_decision
                .as_ref()
                .map(|r| serde_json::to_value(r).unwrap_or(serde_json::Value::Null)),
        }
    }
}

fn cache_source_str(source: CacheSource) -> &'static str {
    match source {
        CacheSource::None => "none",
        CacheSource::Hot => "hot",
        CacheSource::Cold => "cold",
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct CacheColdRow {
    pub tenant_id: Uuid,
    pub fingerprint: String,
    pub envelope: serde_json::Value,
    pub hit_count: i64,
    pub saved_cost_usd: f64,
    pub created_at: DateTime<Utc>,
    pub last_hit_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, FromRow)]
pub struct RateLimitConfigRow {
    pub tenant_id: Uuid,
    pub per_minute: i32,
    pub per_hour: i32,
    pub per_day: i32,
    pub enabled: bool,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct AlertChannelRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub kind: String,
    pub config_json: serde_json::Value,
    pub enabled: bool,
}

#[derive(Debug, Clone, FromRow)]
pub struct AlertConfigRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub thresholds_json: serde_json::Value,
    pub last_fired_json: serde_json::Value,
}

/// Windowed aggregate for analytics/alert-evaluator reads — not a table, just a query projection.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SpendAggregate {
    pub total_cost: f64,
    pub total_requests: i64,
}

/// Row returned by the top-K duplicate-fingerprint recommendation query.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DuplicateFingerprint {
    pub fingerprint: String,
    pub model: String,
    pub occurrences: i64,
    pub total_cost: f64,
}
