//! Append-only usage ledger writes and the windowed reads §4.H describes.

use crate::{DuplicateFingerprint, SpendAggregate, Store, UsageLogRow};
use chrono::{DateTime, Utc};
use modelgate_core::{GatewayError, UsageRecord};
use uuid::Uuid;

impl Store {
    pub async fn insert_usage_record(&self, record: &UsageRecord) -> Result<(), GatewayError> {
        let row = UsageLogRow::from_domain(record);
        sqlx::query(
            "INSERT INTO usage_log
                (id, tenant_id, ts, model, provider, prompt_tokens, completion_tokens, cost,
                 latency_ms, cache_source, fingerprint, routing_decision_json)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(row.id)
        .bind(row.tenant_id)
        .bind(row.ts)
        .bind(row.model)
        .bind(row.provider)
        .bind(row.prompt_tokens)
        .bind(row.completion_tokens)
        .bind(row.cost)
        .bind(row.latency_ms)
        .bind(row.cache_source)
        .bind(row.fingerprint)
        .bind(row.routing_decision_json)
        .execute(&self.pool)
        .await
        .map_err(|e| GatewayError::StoreError(format!("insert_usage_record: {e}")))?;
        Ok(())
    }

    /// Batched insert used when the caller buffers records before a flush, per §4.B's "MAY be
    /// batched" allowance. Empty input is a no-op.
    pub async fn insert_usage_records_batch(&self, records: &[UsageRecord]) -> Result<(), GatewayError> {
        if records.is_empty() {
            return Ok(());
        }
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| GatewayError::StoreError(format!("batch begin: {e}")))?;
        for record in records {
            let row = UsageLogRow::from_domain(record);
            sqlx::query(
                "INSERT INTO usage_log
                    (id, tenant_id, ts, model, provider, prompt_tokens, completion_tokens, cost,
                     latency_ms, cache_source, fingerprint, routing_decision_json)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
            )
            .bind(row.id)
            .bind(row.tenant_id)
            .bind(row.ts)
            .bind(row.model)
            .bind(row.provider)
            .bind(row.prompt_tokens)
            .bind(row.completion_tokens)
            .bind(row.cost)
            .bind(row.latency_ms)
            .bind(row.cache_source)
            .bind(row.fingerprint)
            .bind(row.routing_decision_json)
            .execute(&mut *tx)
            .await
            .map_err(|e| GatewayError::StoreError(format!("batch insert: {e}")))?;
        }
        tx.commit().await.map_err(|e| GatewayError::StoreError(format!("batch commit: {e}")))?;
        Ok(())
    }

    pub async fn spend_in_window(
        &self,
        tenant_id: Uuid,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<SpendAggregate, GatewayError> {
        sqlx::query_as::<_, SpendAggregate>(
            "SELECT COALESCE(SUM(cost), 0.0) AS total_cost, COUNT(*) AS total_requests
             FROM usage_log WHERE tenant_id = $1 AND ts >= $2 AND ts < $3",
        )
        .bind(tenant_id)
        .bind(since)
        .bind(until)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| GatewayError::StoreError(format!("spend_in_window: {e}")))
    }

    pub async fn cache_hit_rate_in_window(
        &self,
        tenant_id: Uuid,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<f64, GatewayError> {
        #[derive(sqlx::FromRow)]
        struct Row {
            total: i64,
            hits: i64,
        }
        let row: Row = sqlx::query_as(
            "SELECT COUNT(*) AS total,
                    COUNT(*) FILTER (WHERE cache_source <> 'none') AS hits
             FROM usage_log WHERE tenant_id = $1 AND ts >= $2 AND ts < $3",
        )
        .bind(tenant_id)
        .bind(since)
        .bind(until)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| GatewayError::StoreError(format!("cache_hit_rate_in_window: {e}")))?;
        if row.total == 0 {
            return Ok(0.0);
        }
        Ok(row.hits as f64 / row.total as f64)
    }

    /// Windowed aggregate by tenant x {model, provider}, used by `/analytics/breakdown`.
    pub async fn usage_by_model(
        &self,
        tenant_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<UsageLogRow>, GatewayError> {
        sqlx::query_as::<_, UsageLogRow>(
            "SELECT * FROM usage_log WHERE tenant_id = $1 AND ts >= $2 ORDER BY ts DESC",
        )
        .bind(tenant_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| GatewayError::StoreError(format!("usage_by_model: {e}")))
    }

    /// Top-K fingerprints served more than once, ordered by total spend — feeds
    /// `/analytics/recommendations`'s "these prompts are worth caching" suggestion.
    pub async fn top_duplicate_fingerprints(
        &self,
        tenant_id: Uuid,
        limit: i64,
    ) -> Result<Vec<DuplicateFingerprint>, GatewayError> {
        sqlx::query_as::<_, DuplicateFingerprint>(
            "SELECT fingerprint, MIN(model) AS model, COUNT(*) AS occurrences, SUM(cost) AS total_cost
             FROM usage_log
             WHERE tenant_id = $1 AND cache_source = 'none'
             GROUP BY fingerprint
             HAVING COUNT(*) > 1
             ORDER BY total_cost DESC
             LIMIT $2",
        )
        .bind(tenant_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| GatewayError::StoreError(format!("top_duplicate_fingerprints: {e}")))
    }
}
