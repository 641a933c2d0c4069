//! Crate-wide error taxonomy. Every component crate's error type converts into a
//! [`GatewayError`] at its public boundary so the HTTP layer only has one type to render.

use crate::types::RateWindow;
use thiserror::Error;

/// How the request pipeline should react to a given failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Client error — do not retry, do not fail over, surface as-is.
    ClientError,
    /// Upstream hiccup — try the next provider-config in priority order.
    Transient,
    /// Upstream told us to back off — try the next provider-config, honoring retry_after if set.
    RateLimited,
    /// Credential problem with one provider-config — skip it for this request.
    ProviderAuth,
    /// Soft dependency (KV/store) is down — degrade, never fail the request because of it.
    Degraded,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request cancelled by caller")]
    Cancelled,

    #[error("missing or malformed API key")]
    AuthMissing,

    #[error("invalid API key")]
    AuthInvalid,

    #[error("rate limit exceeded for {window:?} window, retry after {retry_after_secs}s")]
    RateLimited { window: RateWindow, retry_after_secs: u64 },

    #[error("no provider available for model '{model}' after relaxing constraints")]
    RouterNoCandidate { model: String },

    #[error("upstream provider '{provider}' returned a transient error: {message}")]
    ProviderTransient { provider: String, message: String },

    #[error("upstream provider '{provider}' rejected credentials: {message}")]
    ProviderAuthFailed { provider: String, message: String },

    #[error("upstream provider '{provider}' reported a bad request: {message}")]
    ProviderBadRequest { provider: String, message: String },

    #[error("all {attempted} configured providers failed; last error: {last_error}")]
    AllProvidersExhausted { attempted: usize, last_error: String },

    #[error("key-value store unavailable: {0}")]
    KvUnavailable(String),

    #[error("store operation failed: {0}")]
    StoreError(String),

    #[error("encryption error: {0}")]
    Crypto(String),

    #[error("request validation failed: {0}")]
    Validation(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            GatewayError::Cancelled
            | GatewayError::AuthMissing
            | GatewayError::AuthInvalid
            | GatewayError::RouterNoCandidate { .. }
            | GatewayError::ProviderBadRequest { .. }
            | GatewayError::Validation(_) => ErrorCategory::ClientError,
            GatewayError::RateLimited { .. } => ErrorCategory::RateLimited,
            GatewayError::ProviderTransient { .. } | GatewayError::AllProvidersExhausted { .. } => {
                ErrorCategory::Transient
            }
            GatewayError::ProviderAuthFailed { .. } => ErrorCategory::ProviderAuth,
            GatewayError::KvUnavailable(_) => ErrorCategory::Degraded,
            GatewayError::StoreError(_) | GatewayError::Crypto(_) | GatewayError::Internal(_) => {
                ErrorCategory::Transient
            }
        }
    }

    /// Whether the pipeline should try the next provider-config instead of surfacing this error.
    pub fn is_recoverable_by_failover(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Transient | ErrorCategory::RateLimited | ErrorCategory::ProviderAuth
        )
    }

    /// OpenAI-compatible error envelope `type` field.
    pub fn openai_error_type(&self) -> &'static str {
        match self.category() {
            ErrorCategory::ClientError => "invalid_request_error",
            ErrorCategory::RateLimited => "rate_limit_error",
            ErrorCategory::ProviderAuth => "authentication_error",
            ErrorCategory::Transient | ErrorCategory::Degraded => "api_error",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            GatewayError::Cancelled => 499,
            GatewayError::AuthMissing | GatewayError::AuthInvalid => 401,
            GatewayError::RateLimited { .. } => 429,
            GatewayError::RouterNoCandidate { .. }
            | GatewayError::ProviderBadRequest { .. }
            | GatewayError::Validation(_) => 400,
            GatewayError::ProviderAuthFailed { .. } => 401,
            GatewayError::AllProvidersExhausted { .. } | GatewayError::ProviderTransient { .. } => 502,
            GatewayError::KvUnavailable(_) | GatewayError::StoreError(_) | GatewayError::Crypto(_) | GatewayError::Internal(_) => {
                500
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limited_is_failover_recoverable() {
        let err = GatewayError::RateLimited { window: RateWindow::Minute, retry_after_secs: 5 };
        assert!(err.is_recoverable_by_failover());
        assert_eq!(err.http_status(), 429);
    }

    #[test]
    fn bad_request_is_not_failover_recoverable() {
        let err = GatewayError::ProviderBadRequest {
            provider: "openai".into(),
            message: "bad model".into(),
        };
        assert!(!err.is_recoverable_by_failover());
        assert_eq!(err.http_status(), 400);
    }

    #[test]
    fn provider_auth_failure_is_failover_recoverable() {
        let err = GatewayError::ProviderAuthFailed { provider: "anthropic".into(), message: "401".into() };
        assert!(err.is_recoverable_by_failover());
        assert_eq!(err.category(), ErrorCategory::ProviderAuth);
    }
}
