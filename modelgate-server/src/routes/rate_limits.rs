//! Per-tenant rate-limit configuration and usage introspection, per SPEC_FULL.md §4.E.

use crate::error::ApiError;
use crate::state::AppState;
use axum::Extension;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use modelgate_core::{RateLimitConfig, RateWindowUsage, TenantId};
use modelgate_ratelimit::RateLimitConfigUpdate;

pub async fn get_config(
    State(state): State<AppState>,
    Extension(tenant_id): Extension<TenantId>,
) -> Json<RateLimitConfig> {
    Json(state.rate_limiter.get_config(tenant_id).await)
}

pub async fn update_config(
    State(state): State<AppState>,
    Extension(tenant_id): Extension<TenantId>,
    Json(body): Json<RateLimitConfigUpdate>,
) -> Result<Json<RateLimitConfig>, ApiError> {
    let config = state.rate_limiter.update_config(tenant_id, body).await?;
    Ok(Json(config))
}

pub async fn usage(
    State(state): State<AppState>,
    Extension(tenant_id): Extension<TenantId>,
) -> Json<Vec<RateWindowUsage>> {
    Json(state.rate_limiter.usage(tenant_id).await)
}

pub async fn reset(State(state): State<AppState>, Extension(tenant_id): Extension<TenantId>) -> Result<StatusCode, ApiError> {
    state.rate_limiter.reset(tenant_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
