//! Per-tenant rate-limit configuration CRUD. Absent rows fall back to
//! `modelgate_core::RateLimitConfig::default()` at the call site.

use crate::{RateLimitConfigRow, Store};
use modelgate_core::GatewayError;
use uuid::Uuid;

impl Store {
    pub async fn get_rate_limit_config(
        &self,
        tenant_id: Uuid,
    ) -> Result<Option<RateLimitConfigRow>, GatewayError> {
        sqlx::query_as::<_, RateLimitConfigRow>(
            "SELECT * FROM rate_limit_configs WHERE tenant_id = $1",
        )
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| GatewayError::StoreError(format!("get_rate_limit_config: {e}")))
    }

    pub async fn upsert_rate_limit_config(
        &self,
        tenant_id: Uuid,
        per_minute: i32,
        per_hour: i32,
        per_day: i32,
        enabled: bool,
    ) -> Result<RateLimitConfigRow, GatewayError> {
        sqlx::query_as::<_, RateLimitConfigRow>(
            "INSERT INTO rate_limit_configs (tenant_id, per_minute, per_hour, per_day, enabled, updated_at)
             VALUES ($1, $2, $3, $4, $5, now())
             ON CONFLICT (tenant_id) DO UPDATE
                SET per_minute = EXCLUDED.per_minute,
                    per_hour = EXCLUDED.per_hour,
                    per_day = EXCLUDED.per_day,
                    enabled = EXCLUDED.enabled,
                    updated_at = now()
             RETURNING *",
        )
        .bind(tenant_id)
        .bind(per_minute)
        .bind(per_hour)
        .bind(per_day)
        .bind(enabled)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| GatewayError::StoreError(format!("upsert_rate_limit_config: {e}")))
    }

    pub async fn delete_rate_limit_config(&self, tenant_id: Uuid) -> Result<(), GatewayError> {
        sqlx::query("DELETE FROM rate_limit_configs WHERE tenant_id = $1")
            .bind(tenant_id)
            .execute(&self.pool)
            .await
            .map_err(|e| GatewayError::StoreError(format!("delete_rate_limit_config: {e}")))?;
        Ok(())
    }
}
