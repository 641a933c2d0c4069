//! `/v1/smart/*` — complexity-classified, cost/latency/quality-aware model selection, per
//! SPEC_FULL.md §4.F. `analyze` runs the same decision as `completions` without ever calling a
//! provider, for operators wanting to preview routing before committing a request.

use crate::error::ApiError;
use crate::headers::stamp;
use crate::state::AppState;
use axum::Extension;
use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use modelgate_core::{ChatCompletionRequest, ChatMessage, GatewayError, OptimizeFor, ProviderKind, RoutingDecision, TenantId};
use modelgate_pipeline::SmartParams;
use serde::Deserialize;
use std::collections::HashSet;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Deserialize)]
pub struct SmartCompletionRequest {
    #[serde(flatten)]
    pub request: ChatCompletionRequest,
    #[serde(default)]
    pub optimize_for: OptimizeFor,
    #[serde(default)]
    pub max_latency_ms: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub optimize_for: OptimizeFor,
    #[serde(default)]
    pub max_latency_ms: Option<u32>,
}

async fn enabled_provider_kinds(state: &AppState, tenant_id: TenantId) -> Result<HashSet<ProviderKind>, GatewayError> {
    let configs = state.store.list_provider_configs(*tenant_id).await?;
    Ok(configs
        .into_iter()
        .filter(|c| c.enabled)
        .filter_map(|c| c.provider.parse::<ProviderKind>().ok())
        .collect())
}

pub async fn create_smart_completion(
    State(state): State<AppState>,
    Extension(tenant_id): Extension<TenantId>,
    Json(body): Json<SmartCompletionRequest>,
) -> Result<Response, ApiError> {
    let smart = SmartParams { optimize_for: body.optimize_for, max_latency_ms: body.max_latency_ms };
    let cancellation = CancellationToken::new();
    match state.pipeline.complete(tenant_id, body.request, Some(smart), cancellation).await {
        Ok(outcome) => Ok(stamp(Json(outcome.response).into_response(), &outcome.rate_usage)),
        Err(e) => Err(ApiError::with_usage(e.error, e.rate_usage)),
    }
}

pub async fn analyze(
    State(state): State<AppState>,
    Extension(tenant_id): Extension<TenantId>,
    Json(body): Json<AnalyzeRequest>,
) -> Result<Json<RoutingDecision>, ApiError> {
    let enabled = enabled_provider_kinds(&state, tenant_id).await?;
    let decision = modelgate_router::route(&body.messages, body.optimize_for, body.max_latency_ms, &enabled)?;
    Ok(Json(decision))
}

pub async fn info() -> Json<Vec<modelgate_core::ModelProfile>> {
    Json(modelgate_router::MODEL_PROFILES.clone())
}
