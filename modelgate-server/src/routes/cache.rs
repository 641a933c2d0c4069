//! `/cache/stats` and `/cache/clear`, per SPEC_FULL.md §4.D and §11's glob-pattern clearing.

use crate::error::ApiError;
use crate::state::AppState;
use axum::Extension;
use axum::Json;
use axum::extract::State;
use modelgate_cache::ClearScope;
use modelgate_core::TenantId;
use modelgate_store::CacheStats;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ClearRequest {
    #[serde(default)]
    pub scope: ClearScopeParam,
    pub pattern: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearScopeParam {
    Hot,
    Cold,
    #[default]
    All,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub hot_cleared: u64,
    pub cold_cleared: u64,
}

pub async fn stats(State(state): State<AppState>, Extension(tenant_id): Extension<TenantId>) -> Result<Json<CacheStats>, ApiError> {
    Ok(Json(state.cache.stats(tenant_id).await?))
}

pub async fn clear(
    State(state): State<AppState>,
    Extension(tenant_id): Extension<TenantId>,
    Json(body): Json<ClearRequest>,
) -> Result<Json<ClearResponse>, ApiError> {
    let scope = match body.scope {
        ClearScopeParam::Hot => ClearScope::Hot,
        ClearScopeParam::Cold => ClearScope::Cold,
        ClearScopeParam::All => ClearScope::All,
    };
    let result = state.cache.clear(tenant_id, scope, body.pattern.as_deref()).await?;
    Ok(Json(ClearResponse { hot_cleared: result.hot_cleared, cold_cleared: result.cold_cleared }))
}
