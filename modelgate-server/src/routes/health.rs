//! `/healthz` / `/readyz` — ungated liveness/readiness probes, per SPEC_FULL.md §6.
//! Liveness never touches the network; readiness confirms both the relational store and the KV
//! are actually reachable.

use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
}

pub async fn healthz() -> Json<HealthStatus> {
    Json(HealthStatus { status: "ok" })
}

#[derive(Debug, Serialize)]
pub struct ReadyStatus {
    pub store: bool,
    pub kv: bool,
}

pub async fn readyz(State(state): State<AppState>) -> (StatusCode, Json<ReadyStatus>) {
    let store_ok = state.store.ping().await.is_ok();
    let kv_ok = state.kv.ping().await.is_ok();
    let status = if store_ok && kv_ok { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status, Json(ReadyStatus { store: store_ok, kv: kv_ok }))
}
