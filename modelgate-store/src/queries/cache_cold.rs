//! Durable cold-cache rows: at most one per (tenant, fingerprint), monotone hit-count.

use crate::{CacheColdRow, Store};
use modelgate_core::GatewayError;
use uuid::Uuid;

impl Store {
    /// `INSERT ... ON CONFLICT DO UPDATE SET hit_count = hit_count + 1, last_hit_at = now()` per
    /// §4.B — commutative and monotone regardless of call order between concurrent fillers.
    pub async fn upsert_cache_cold(
        &self,
        tenant_id: Uuid,
        fingerprint: &str,
        envelope: &serde_json::Value,
        saved_cost_usd: f64,
    ) -> Result<CacheColdRow, GatewayError> {
        sqlx::query_as::<_, CacheColdRow>(
            "INSERT INTO cache_cold (tenant_id, fingerprint, envelope, hit_count, saved_cost_usd, last_hit_at)
             VALUES ($1, $2, $3, 0, $4, now())
             ON CONFLICT (tenant_id, fingerprint) DO UPDATE
                SET hit_count = cache_cold.hit_count + 1,
                    saved_cost_usd = cache_cold.saved_cost_usd + EXCLUDED.saved_cost_usd,
                    last_hit_at = now()
             RETURNING *",
        )
        .bind(tenant_id)
        .bind(fingerprint)
        .bind(envelope)
        .bind(saved_cost_usd)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| GatewayError::StoreError(format!("upsert_cache_cold: {e}")))
    }

    pub async fn get_cache_cold(
        &self,
        tenant_id: Uuid,
        fingerprint: &str,
    ) -> Result<Option<CacheColdRow>, GatewayError> {
        sqlx::query_as::<_, CacheColdRow>(
            "SELECT * FROM cache_cold WHERE tenant_id = $1 AND fingerprint = $2",
        )
        .bind(tenant_id)
        .bind(fingerprint)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| GatewayError::StoreError(format!("get_cache_cold: {e}")))
    }

    /// Record a cache hit on an existing row without changing the stored envelope.
    pub async fn record_cache_hit(&self, tenant_id: Uuid, fingerprint: &str) -> Result<(), GatewayError> {
        sqlx::query(
            "UPDATE cache_cold SET hit_count = hit_count + 1, last_hit_at = now()
             WHERE tenant_id = $1 AND fingerprint = $2",
        )
        .bind(tenant_id)
        .bind(fingerprint)
        .execute(&self.pool)
        .await
        .map_err(|e| GatewayError::StoreError(format!("record_cache_hit: {e}")))?;
        Ok(())
    }

    pub async fn cache_stats(&self, tenant_id: Uuid) -> Result<CacheStats, GatewayError> {
        #[derive(sqlx::FromRow)]
        struct Row {
            entries: i64,
            hits: Option<i64>,
            saved_cost: Option<f64>,
        }
        let row: Row = sqlx::query_as(
            "SELECT COUNT(*) AS entries, SUM(hit_count) AS hits, SUM(saved_cost_usd) AS saved_cost
             FROM cache_cold WHERE tenant_id = $1",
        )
        .bind(tenant_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| GatewayError::StoreError(format!("cache_stats: {e}")))?;
        Ok(CacheStats {
            entries: row.entries,
            hits: row.hits.unwrap_or(0),
            saved_cost_usd: row.saved_cost.unwrap_or(0.0),
        })
    }

    pub async fn clear_cache_cold(
        &self,
        tenant_id: Uuid,
        pattern: Option<&str>,
    ) -> Result<u64, GatewayError> {
        let result = match pattern {
            Some(p) => {
                // Translate a simple glob (`*` wildcard) into a SQL LIKE pattern.
                let like = p.replace('%', "\\%").replace('_', "\\_").replace('*', "%");
                sqlx::query("DELETE FROM cache_cold WHERE tenant_id = $1 AND fingerprint LIKE $2")
                    .bind(tenant_id)
                    .bind(like)
                    .execute(&self.pool)
                    .await
            }
            None => {
                sqlx::query("DELETE FROM cache_cold WHERE tenant_id = $1")
                    .bind(tenant_id)
                    .execute(&self.pool)
                    .await
            }
        }
        .map_err(|e| GatewayError::StoreError(format!("clear_cache_cold: {e}")))?;
        Ok(result.rows_affected())
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct CacheStats {
    pub entries: i64,
    pub hits: i64,
    pub saved_cost_usd: f64,
}
