//! CRUD for a tenant's provider credentials and priority ordering.

use crate::{ProviderConfigRow, Store};
use modelgate_core::GatewayError;
use uuid::Uuid;

impl Store {
    pub async fn create_provider_config(
        &self,
        tenant_id: Uuid,
        provider: &str,
        api_key_encrypted: &str,
        priority: i32,
    ) -> Result<ProviderConfigRow, GatewayError> {
        sqlx::query_as::<_, ProviderConfigRow>(
            "INSERT INTO provider_configs (id, tenant_id, provider, api_key_encrypted, priority, enabled)
             VALUES ($1, $2, $3, $4, $5, true) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(tenant_id)
        .bind(provider)
        .bind(api_key_encrypted)
        .bind(priority)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| GatewayError::StoreError(format!("create_provider_config: {e}")))
    }

    /// Ordered ascending by priority, matching §4.G step 4's failover ordering.
    pub async fn list_provider_configs(
        &self,
        tenant_id: Uuid,
    ) -> Result<Vec<ProviderConfigRow>, GatewayError> {
        sqlx::query_as::<_, ProviderConfigRow>(
            "SELECT * FROM provider_configs WHERE tenant_id = $1 ORDER BY priority ASC",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| GatewayError::StoreError(format!("list_provider_configs: {e}")))
    }

    pub async fn set_provider_config_enabled(
        &self,
        id: Uuid,
        enabled: bool,
    ) -> Result<(), GatewayError> {
        sqlx::query("UPDATE provider_configs SET enabled = $2 WHERE id = $1")
            .bind(id)
            .bind(enabled)
            .execute(&self.pool)
            .await
            .map_err(|e| GatewayError::StoreError(format!("set_provider_config_enabled: {e}")))?;
        Ok(())
    }

    pub async fn delete_provider_config(&self, id: Uuid) -> Result<(), GatewayError> {
        sqlx::query("DELETE FROM provider_configs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| GatewayError::StoreError(format!("delete_provider_config: {e}")))?;
        Ok(())
    }
}
