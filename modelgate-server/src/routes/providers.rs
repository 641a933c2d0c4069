//! CRUD for a tenant's provider credentials and failover priority, per SPEC_FULL.md §6.
//! Encrypted key material never leaves this boundary — responses carry only the fields a client
//! needs to manage its own configuration.

use crate::error::ApiError;
use crate::state::AppState;
use axum::Extension;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use modelgate_core::{GatewayError, ProviderKind, TenantId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateProviderConfigRequest {
    pub provider: ProviderKind,
    pub api_key: String,
    #[serde(default)]
    pub priority: u32,
}

#[derive(Debug, Deserialize)]
pub struct SetEnabledRequest {
    pub enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct ProviderConfigResponse {
    pub id: Uuid,
    pub provider: ProviderKind,
    pub priority: u32,
    pub enabled: bool,
}

/// Fails with `AuthInvalid` rather than a generic not-found so a tenant probing another tenant's
/// provider-config id cannot distinguish "doesn't exist" from "exists but isn't yours".
async fn owned_config(
    state: &AppState,
    tenant_id: TenantId,
    id: Uuid,
) -> Result<modelgate_store::ProviderConfigRow, ApiError> {
    let configs = state.store.list_provider_configs(*tenant_id).await?;
    configs
        .into_iter()
        .find(|row| row.id == id)
        .ok_or_else(|| ApiError::new(GatewayError::AuthInvalid))
}

pub async fn list(
    State(state): State<AppState>,
    Extension(tenant_id): Extension<TenantId>,
) -> Result<Json<Vec<ProviderConfigResponse>>, ApiError> {
    let rows = state.store.list_provider_configs(*tenant_id).await?;
    let out = rows
        .into_iter()
        .map(|row| row.into_domain())
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|cfg| ProviderConfigResponse { id: *cfg.id, provider: cfg.provider, priority: cfg.priority, enabled: cfg.enabled })
        .collect();
    Ok(Json(out))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(tenant_id): Extension<TenantId>,
    Json(body): Json<CreateProviderConfigRequest>,
) -> Result<Json<ProviderConfigResponse>, ApiError> {
    let encrypted = state.cipher.encrypt(&body.api_key)?;
    let row = state
        .store
        .create_provider_config(*tenant_id, body.provider.as_str(), &encrypted, body.priority as i32)
        .await?;
    Ok(Json(ProviderConfigResponse { id: row.id, provider: body.provider, priority: row.priority as u32, enabled: row.enabled }))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(tenant_id): Extension<TenantId>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    owned_config(&state, tenant_id, id).await?;
    state.store.delete_provider_config(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_enabled(
    State(state): State<AppState>,
    Extension(tenant_id): Extension<TenantId>,
    Path(id): Path<Uuid>,
    Json(body): Json<SetEnabledRequest>,
) -> Result<StatusCode, ApiError> {
    owned_config(&state, tenant_id, id).await?;
    state.store.set_provider_config_enabled(id, body.enabled).await?;
    Ok(StatusCode::NO_CONTENT)
}
