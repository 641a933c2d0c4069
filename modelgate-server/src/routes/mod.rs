//! Route table: one module per resource, wired together in [`router`].

mod alerts;
mod analytics;
mod auth_register;
mod cache;
mod chat;
mod health;
mod providers;
mod rate_limits;
mod smart;

use crate::auth::require_tenant;
use crate::state::AppState;
use axum::Router;
use axum::middleware;
use axum::routing::{get, post, put};
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub fn router(state: AppState, request_timeout: Duration) -> Router {
    let authenticated = Router::new()
        .route("/v1/chat/completions", post(chat::create_chat_completion))
        .route("/v1/smart/completions", post(smart::create_smart_completion))
        .route("/v1/smart/analyze", post(smart::analyze))
        .route("/v1/smart/info", get(smart::info))
        .route("/analytics/usage", get(analytics::usage))
        .route("/analytics/breakdown", get(analytics::breakdown))
        .route("/analytics/recommendations", get(analytics::recommendations))
        .route("/providers", get(providers::list).post(providers::create))
        .route("/providers/{id}", axum::routing::delete(providers::delete))
        .route("/providers/{id}/enabled", put(providers::set_enabled))
        .route("/alerts/channels", get(alerts::list_channels).post(alerts::create_channel))
        .route("/alerts/channels/{id}", axum::routing::delete(alerts::delete_channel))
        .route("/alerts/configs", get(alerts::get_config).put(alerts::upsert_config))
        .route("/rate-limits/config", get(rate_limits::get_config).put(rate_limits::update_config))
        .route("/rate-limits/usage", get(rate_limits::usage))
        .route("/rate-limits/reset", post(rate_limits::reset))
        .route("/cache/stats", get(cache::stats))
        .route("/cache/clear", post(cache::clear))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_tenant));

    let public = Router::new()
        .route("/auth/register", post(auth_register::register))
        .route("/healthz", get(health::healthz))
        .route("/readyz", get(health::readyz));

    Router::new()
        .merge(authenticated)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}
