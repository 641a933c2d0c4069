//! `POST /v1/chat/completions` — the OpenAI-compatible entry point, no smart routing.

use crate::error::ApiError;
use crate::headers::stamp;
use crate::state::AppState;
use axum::Extension;
use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use modelgate_core::{ChatCompletionRequest, TenantId};
use tokio_util::sync::CancellationToken;

pub async fn create_chat_completion(
    State(state): State<AppState>,
    Extension(tenant_id): Extension<TenantId>,
    Json(request): Json<ChatCompletionRequest>,
) -> Result<Response, ApiError> {
    let cancellation = CancellationToken::new();
    match state.pipeline.complete(tenant_id, request, None, cancellation).await {
        Ok(outcome) => Ok(stamp(Json(outcome.response).into_response(), &outcome.rate_usage)),
        Err(e) => Err(ApiError::with_usage(e.error, e.rate_usage)),
    }
}
