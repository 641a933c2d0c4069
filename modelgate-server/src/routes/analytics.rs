//! `GET /analytics/*` — read-only derived queries over the usage ledger, per SPEC_FULL.md §4.H.

use crate::error::ApiError;
use crate::state::AppState;
use axum::Extension;
use axum::Json;
use axum::extract::{Query, State};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use modelgate_core::TenantId;
use modelgate_ledger::{CacheRecommendation, ModelBreakdown};
use modelgate_store::SpendAggregate;
use serde::Deserialize;

fn default_since() -> DateTime<Utc> {
    Utc::now() - ChronoDuration::days(30)
}

#[derive(Debug, Deserialize)]
pub struct WindowQuery {
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct RecommendationsQuery {
    pub limit: Option<i64>,
}

pub async fn usage(
    State(state): State<AppState>,
    Extension(tenant_id): Extension<TenantId>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<SpendAggregate>, ApiError> {
    let since = query.since.unwrap_or_else(default_since);
    let until = query.until.unwrap_or_else(Utc::now);
    let aggregate = state.ledger.store().spend_in_window(*tenant_id, since, until).await?;
    Ok(Json(aggregate))
}

pub async fn breakdown(
    State(state): State<AppState>,
    Extension(tenant_id): Extension<TenantId>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<Vec<ModelBreakdown>>, ApiError> {
    let since = query.since.unwrap_or_else(default_since);
    let breakdown = state.ledger.usage_breakdown(tenant_id, since).await?;
    Ok(Json(breakdown))
}

pub async fn recommendations(
    State(state): State<AppState>,
    Extension(tenant_id): Extension<TenantId>,
    Query(query): Query<RecommendationsQuery>,
) -> Result<Json<Vec<CacheRecommendation>>, ApiError> {
    let limit = query.limit.unwrap_or(10).clamp(1, 100);
    let recommendations = state.ledger.recommendations(tenant_id, limit).await?;
    Ok(Json(recommendations))
}
