//! CRUD for alert channels and per-tenant alert thresholds, read by `modelgate-alerts`'s
//! evaluator loop. Per SPEC_FULL.md §4.I/§4.J.

use crate::error::ApiError;
use crate::state::AppState;
use axum::Extension;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use modelgate_alerts::AlertThresholds;
use modelgate_core::{AlertChannelKind, ChannelConfig, GatewayError, TenantId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn channel_kind_str(kind: AlertChannelKind) -> &'static str {
    match kind {
        AlertChannelKind::Slack => "slack",
        AlertChannelKind::Email => "email",
        AlertChannelKind::Webhook => "webhook",
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateChannelRequest {
    pub kind: AlertChannelKind,
    pub config: ChannelConfig,
}

#[derive(Debug, Serialize)]
pub struct ChannelResponse {
    pub id: Uuid,
    pub kind: String,
    pub config: serde_json::Value,
    pub enabled: bool,
}

pub async fn list_channels(
    State(state): State<AppState>,
    Extension(tenant_id): Extension<TenantId>,
) -> Result<Json<Vec<ChannelResponse>>, ApiError> {
    let rows = state.store.list_alert_channels(*tenant_id).await?;
    Ok(Json(
        rows.into_iter()
            .map(|row| ChannelResponse { id: row.id, kind: row.kind, config: row.config_json, enabled: row.enabled })
            .collect(),
    ))
}

pub async fn create_channel(
    State(state): State<AppState>,
    Extension(tenant_id): Extension<TenantId>,
    Json(body): Json<CreateChannelRequest>,
) -> Result<Json<ChannelResponse>, ApiError> {
    let config_json = serde_json::to_value(&body.config).map_err(|e| GatewayError::Validation(e.to_string()))?;
    let row = state
        .store
        .create_alert_channel(*tenant_id, channel_kind_str(body.kind), config_json)
        .await?;
    Ok(Json(ChannelResponse { id: row.id, kind: row.kind, config: row.config_json, enabled: row.enabled }))
}

pub async fn delete_channel(
    State(state): State<AppState>,
    Extension(tenant_id): Extension<TenantId>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let channels = state.store.list_alert_channels(*tenant_id).await?;
    if !channels.iter().any(|c| c.id == id) {
        return Err(ApiError::new(GatewayError::AuthInvalid));
    }
    state.store.delete_alert_channel(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_config(
    State(state): State<AppState>,
    Extension(tenant_id): Extension<TenantId>,
) -> Result<Json<AlertThresholds>, ApiError> {
    let row = state.store.get_alert_config(*tenant_id).await?;
    let thresholds = match row {
        Some(row) => serde_json::from_value(row.thresholds_json).unwrap_or_default(),
        None => AlertThresholds::default(),
    };
    Ok(Json(thresholds))
}

pub async fn upsert_config(
    State(state): State<AppState>,
    Extension(tenant_id): Extension<TenantId>,
    Json(body): Json<AlertThresholds>,
) -> Result<Json<AlertThresholds>, ApiError> {
    let thresholds_json = serde_json::to_value(&body).map_err(|e| GatewayError::Validation(e.to_string()))?;
    let row = state.store.upsert_alert_config(*tenant_id, thresholds_json).await?;
    let thresholds = serde_json::from_value(row.thresholds_json).unwrap_or_default();
    Ok(Json(thresholds))
}
