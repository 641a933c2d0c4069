//! Renders a `GatewayError` into the OpenAI-compatible `{error: {message, type, code}}` envelope,
//! per SPEC_FULL.md §7. The single point where internal errors are turned into client-facing JSON —
//! no provider key or stack trace ever crosses this boundary.

use crate::headers::{rate_limit_headers, retry_after_header};
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use modelgate_core::{GatewayError, RateWindowUsage};
use serde::Serialize;

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    message: String,
    #[serde(rename = "type")]
    kind: &'static str,
    code: &'static str,
}

/// Wraps a `GatewayError` with whatever rate-limit usage the pipeline had already computed, so the
/// response carries `X-RateLimit-*` (and `Retry-After` on 429) even when the request ultimately
/// failed.
pub struct ApiError {
    pub error: GatewayError,
    pub rate_usage: Vec<RateWindowUsage>,
}

impl ApiError {
    pub fn new(error: GatewayError) -> Self {
        Self { error, rate_usage: Vec::new() }
    }

    pub fn with_usage(error: GatewayError, rate_usage: Vec<RateWindowUsage>) -> Self {
        Self { error, rate_usage }
    }
}

impl From<GatewayError> for ApiError {
    fn from(error: GatewayError) -> Self {
        Self::new(error)
    }
}

fn error_code(error: &GatewayError) -> &'static str {
    match error {
        GatewayError::Cancelled => "request_cancelled",
        GatewayError::AuthMissing => "auth_missing",
        GatewayError::AuthInvalid => "auth_invalid",
        GatewayError::RateLimited { .. } => "rate_limit_exceeded",
        GatewayError::RouterNoCandidate { .. } => "no_candidate_model",
        GatewayError::ProviderTransient { .. } => "provider_transient_error",
        GatewayError::ProviderAuthFailed { .. } => "provider_auth_failed",
        GatewayError::ProviderBadRequest { .. } => "provider_bad_request",
        GatewayError::AllProvidersExhausted { .. } => "all_providers_exhausted",
        GatewayError::KvUnavailable(_) => "kv_unavailable",
        GatewayError::StoreError(_) => "store_error",
        GatewayError::Crypto(_) => "internal_error",
        GatewayError::Validation(_) => "validation_error",
        GatewayError::Internal(_) => "internal_error",
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.error.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorBody {
            error: ErrorDetail {
                message: self.error.to_string(),
                kind: self.error.openai_error_type(),
                code: error_code(&self.error),
            },
        };

        let mut response = (status, Json(body)).into_response();
        response.headers_mut().extend(rate_limit_headers(&self.rate_usage));
        if let GatewayError::RateLimited { retry_after_secs, .. } = &self.error {
            response.headers_mut().extend(retry_after_header(*retry_after_secs));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_missing_renders_as_401_invalid_request() {
        let response = ApiError::new(GatewayError::AuthMissing).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn rate_limited_carries_retry_after_header() {
        let response = ApiError::new(GatewayError::RateLimited {
            window: modelgate_core::RateWindow::Minute,
            retry_after_secs: 42,
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get("retry-after").unwrap(), "42");
    }
}
