//! Tenant authentication middleware, per SPEC_FULL.md §4.K: `X-API-Key` or
//! `Authorization: Bearer` are equivalent; a non-matching or absent key short-circuits with 401
//! in the OpenAI error envelope before any downstream component runs.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use modelgate_core::{GatewayError, TenantId};

fn extract_presented_key(request: &Request) -> Option<String> {
    if let Some(value) = request.headers().get("x-api-key") {
        return value.to_str().ok().map(str::to_string);
    }
    let auth = request.headers().get(axum::http::header::AUTHORIZATION)?;
    let auth = auth.to_str().ok()?;
    auth.strip_prefix("Bearer ").map(str::to_string)
}

pub async fn require_tenant(State(state): State<AppState>, mut request: Request, next: Next) -> Result<Response, ApiError> {
    let presented = extract_presented_key(&request).ok_or(ApiError::new(GatewayError::AuthMissing))?;

    let tenant = state
        .store
        .find_tenant_by_api_key(&presented)
        .await
        .map_err(ApiError::new)?
        .ok_or_else(|| ApiError::new(GatewayError::AuthInvalid))?;

    request.extensions_mut().insert(TenantId::from(tenant.id));
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn bearer_prefix_is_stripped() {
        let request = Request::builder()
            .header(axum::http::header::AUTHORIZATION, "Bearer sk-live-abc")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_presented_key(&request), Some("sk-live-abc".to_string()));
    }

    #[test]
    fn x_api_key_takes_precedence_when_both_present() {
        let request = Request::builder()
            .header("x-api-key", "from-header")
            .header(axum::http::header::AUTHORIZATION, "Bearer from-bearer")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_presented_key(&request), Some("from-header".to_string()));
    }

    #[test]
    fn missing_both_headers_yields_none() {
        let request = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(extract_presented_key(&request), None);
    }
}
