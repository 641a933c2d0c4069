//! Alert channel and alert config CRUD, read by `modelgate-alerts`'s evaluator.

use crate::{AlertChannelRow, AlertConfigRow, Store};
use modelgate_core::GatewayError;
use uuid::Uuid;

impl Store {
    pub async fn create_alert_channel(
        &self,
        tenant_id: Uuid,
        kind: &str,
        config_json: serde_json::Value,
    ) -> Result<AlertChannelRow, GatewayError> {
        sqlx::query_as::<_, AlertChannelRow>(
            "INSERT INTO alert_channels (id, tenant_id, kind, config_json, enabled)
             VALUES ($1, $2, $3, $4, true) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(tenant_id)
        .bind(kind)
        .bind(config_json)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| GatewayError::StoreError(format!("create_alert_channel: {e}")))
    }

    pub async fn list_alert_channels(&self, tenant_id: Uuid) -> Result<Vec<AlertChannelRow>, GatewayError> {
        sqlx::query_as::<_, AlertChannelRow>(
            "SELECT * FROM alert_channels WHERE tenant_id = $1 AND enabled = true",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| GatewayError::StoreError(format!("list_alert_channels: {e}")))
    }

    pub async fn delete_alert_channel(&self, id: Uuid) -> Result<(), GatewayError> {
        sqlx::query("DELETE FROM alert_channels WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| GatewayError::StoreError(format!("delete_alert_channel: {e}")))?;
        Ok(())
    }

    pub async fn upsert_alert_config(
        &self,
        tenant_id: Uuid,
        thresholds_json: serde_json::Value,
    ) -> Result<AlertConfigRow, GatewayError> {
        sqlx::query_as::<_, AlertConfigRow>(
            "INSERT INTO alert_configs (id, tenant_id, thresholds_json, last_fired_json)
             VALUES ($1, $2, $3, '{}'::jsonb)
             ON CONFLICT (tenant_id) DO UPDATE SET thresholds_json = EXCLUDED.thresholds_json
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(tenant_id)
        .bind(thresholds_json)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| GatewayError::StoreError(format!("upsert_alert_config: {e}")))
    }

    pub async fn get_alert_config(&self, tenant_id: Uuid) -> Result<Option<AlertConfigRow>, GatewayError> {
        sqlx::query_as::<_, AlertConfigRow>("SELECT * FROM alert_configs WHERE tenant_id = $1")
            .bind(tenant_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| GatewayError::StoreError(format!("get_alert_config: {e}")))
    }

    /// Every tenant with an alert config, read once per evaluator tick.
    pub async fn list_tenants_with_alert_configs(&self) -> Result<Vec<AlertConfigRow>, GatewayError> {
        sqlx::query_as::<_, AlertConfigRow>("SELECT * FROM alert_configs")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| GatewayError::StoreError(format!("list_tenants_with_alert_configs: {e}")))
    }

    pub async fn update_last_fired(
        &self,
        tenant_id: Uuid,
        last_fired_json: serde_json::Value,
    ) -> Result<(), GatewayError> {
        sqlx::query("UPDATE alert_configs SET last_fired_json = $2 WHERE tenant_id = $1")
            .bind(tenant_id)
            .bind(last_fired_json)
            .execute(&self.pool)
            .await
            .map_err(|e| GatewayError::StoreError(format!("update_last_fired: {e}")))?;
        Ok(())
    }
}
