//! Process entry point, per SPEC_FULL.md §4.L: load config, initialize telemetry, build every
//! shared client once, construct every component, spawn the background tasks, serve, and drain on
//! shutdown.

mod auth;
mod config;
mod error;
mod headers;
mod routes;
mod state;

use config::AppConfig;
use modelgate_alerts::{Evaluator, EvaluatorConfig, NotificationDispatcher, SlackDispatcher, WebhookDispatcher};
use modelgate_cache::TwoTierCache;
use modelgate_core::AlertChannelKind;
use modelgate_kv::{KvStore, RedisKv, RedisKvConfig};
use modelgate_ledger::Ledger;
use modelgate_pipeline::{Pipeline, PipelineConfig};
use modelgate_providers::{ProviderKeyCipher, ProviderRegistry, ProviderRegistryConfig};
use modelgate_ratelimit::RateLimiter;
use modelgate_store::Store;
use state::AppState;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    let app_config = AppConfig::from_env().expect("invalid process configuration");

    modelgate_telemetry::init(modelgate_telemetry::TelemetryConfig::from_env());

    let store = Store::connect(&app_config.database_url, app_config.database_max_connections)
        .await
        .expect("failed to connect to Postgres");

    let kv: Arc<dyn KvStore> = Arc::new(
        RedisKv::connect(RedisKvConfig::new(app_config.redis_url.clone()))
            .await
            .expect("failed to connect to Redis"),
    );

    let cipher = ProviderKeyCipher::from_base64(&app_config.provider_secret_key).expect("invalid PROVIDER_SECRET_KEY");

    let registry = ProviderRegistry::new(ProviderRegistryConfig::default()).expect("failed to build provider registry");

    let ledger = Ledger::new(store.clone());

    let pipeline_cache = TwoTierCache::new(kv.clone(), store.clone(), app_config.hot_cache_ttl);
    let pipeline_rate_limiter = RateLimiter::new(kv.clone(), store.clone());
    let pipeline = Arc::new(Pipeline::new(
        pipeline_cache,
        pipeline_rate_limiter,
        registry,
        store.clone(),
        ledger.clone(),
        cipher.clone(),
        PipelineConfig { provider_timeout: app_config.request_timeout },
    ));

    let admin_cache = Arc::new(TwoTierCache::new(kv.clone(), store.clone(), app_config.hot_cache_ttl));
    let admin_rate_limiter = Arc::new(RateLimiter::new(kv.clone(), store.clone()));

    let app_state = AppState {
        store: store.clone(),
        kv: kv.clone(),
        cache: admin_cache,
        rate_limiter: admin_rate_limiter.clone(),
        ledger: ledger.clone(),
        cipher,
        pipeline,
    };

    let shutdown = CancellationToken::new();

    let retry_queue = ledger.retry_queue();
    let retry_task = tokio::spawn(modelgate_ledger::run_retry_queue(retry_queue, store.clone(), shutdown.clone()));

    let http_client = reqwest::Client::new();
    let mut dispatchers: HashMap<AlertChannelKind, Arc<dyn NotificationDispatcher>> = HashMap::new();
    dispatchers.insert(AlertChannelKind::Slack, Arc::new(SlackDispatcher::new(http_client.clone())));
    dispatchers.insert(AlertChannelKind::Webhook, Arc::new(WebhookDispatcher::new(http_client)));
    if let Some(smtp) = app_config.smtp.clone() {
        let settings = modelgate_alerts::SmtpSettings {
            host: smtp.host,
            port: smtp.port,
            username: smtp.username,
            password: smtp.password,
            from: smtp.from,
        };
        match modelgate_alerts::EmailDispatcher::new(settings) {
            Ok(dispatcher) => {
                dispatchers.insert(AlertChannelKind::Email, Arc::new(dispatcher));
            }
            Err(e) => tracing::warn!(error = %e, "failed to build email dispatcher, email alerts disabled"),
        }
    }
    let evaluator = Evaluator::new(
        store.clone(),
        ledger.clone(),
        RateLimiter::new(kv.clone(), store.clone()),
        dispatchers,
        EvaluatorConfig { tick_interval: app_config.alert_tick_interval },
    );
    let evaluator_shutdown = shutdown.clone();
    let evaluator_task = tokio::spawn(async move { evaluator.run(evaluator_shutdown).await });

    let router = routes::router(app_state, app_config.request_timeout);

    let listener = tokio::net::TcpListener::bind(app_config.bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {e}", app_config.bind_addr));
    tracing::info!(addr = %app_config.bind_addr, "modelgate-server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    shutdown.cancel();
    let _ = tokio::join!(retry_task, evaluator_task);
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install ctrl_c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    tracing::info!("shutdown signal received, draining in-flight requests");
}
