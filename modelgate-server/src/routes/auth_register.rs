//! `POST /auth/register` — the only endpoint that ever returns a plaintext API key; the store
//! only ever retains its SHA-256 digest afterward.

use crate::error::ApiError;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as BASE64;
use modelgate_core::GatewayError;
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub tenant_id: uuid::Uuid,
    pub api_key: String,
}

fn generate_api_key() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    format!("sk-mg-{}", BASE64.encode(bytes))
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    if body.name.trim().is_empty() {
        return Err(ApiError::new(GatewayError::Validation("name must not be empty".to_string())));
    }
    let api_key = generate_api_key();
    let tenant = state.store.create_tenant(&body.name, &api_key).await?;
    Ok(Json(RegisterResponse { tenant_id: tenant.id, api_key }))
}
