//! Tenant registration and API-key digest lookup.

use crate::{Store, TenantRow};
use modelgate_core::GatewayError;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// SHA-256 hex digest of a presented API key — never store or log the plaintext key.
pub fn digest_api_key(plaintext: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(plaintext.as_bytes());
    format!("{:x}", hasher.finalize())
}

impl Store {
    pub async fn create_tenant(&self, name: &str, api_key_plaintext: &str) -> Result<TenantRow, GatewayError> {
        let id = Uuid::new_v4();
        let digest = digest_api_key(api_key_plaintext);
        let row = sqlx::query_as::<_, TenantRow>(
            "INSERT INTO tenants (id, name, api_key_digest) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(id)
        .bind(name)
        .bind(digest)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| GatewayError::StoreError(format!("create_tenant: {e}")))?;
        Ok(row)
    }

    pub async fn find_tenant_by_api_key(&self, plaintext: &str) -> Result<Option<TenantRow>, GatewayError> {
        let digest = digest_api_key(plaintext);
        sqlx::query_as::<_, TenantRow>("SELECT * FROM tenants WHERE api_key_digest = $1")
            .bind(digest)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| GatewayError::StoreError(format!("find_tenant_by_api_key: {e}")))
    }

    pub async fn get_tenant(&self, tenant_id: Uuid) -> Result<Option<TenantRow>, GatewayError> {
        sqlx::query_as::<_, TenantRow>("SELECT * FROM tenants WHERE id = $1")
            .bind(tenant_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| GatewayError::StoreError(format!("get_tenant: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_deterministic_and_hex() {
        let a = digest_api_key("sk-live-abc123");
        let b = digest_api_key("sk-live-abc123");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn distinct_keys_digest_differently() {
        assert_ne!(digest_api_key("key-a"), digest_api_key("key-b"));
    }
}
