//! Structured logging initialization, following the teacher's `Once`-guarded registry-composition
//! pattern: a single [`init`] call wires an `EnvFilter` plus a `fmt` layer, switching between
//! human-readable and JSON output based on configuration.

use std::sync::Once;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub service_name: String,
    pub default_level: String,
    pub json: bool,
}

impl TelemetryConfig {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self { service_name: service_name.into(), default_level: "info".to_string(), json: false }
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.default_level = level.into();
        self
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// `SERVICE_NAME`, `LOG_LEVEL`, `LOG_FORMAT=json|text`.
    pub fn from_env() -> Self {
        let service_name = std::env::var("SERVICE_NAME").unwrap_or_else(|_| "modelgate-server".to_string());
        let default_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let json = std::env::var("LOG_FORMAT").map(|v| v == "json").unwrap_or(false);
        Self { service_name, default_level, json }
    }
}

/// Initialize the global tracing subscriber. Idempotent — later calls in the same process are
/// no-ops, matching the teacher's `Once`-guard so test binaries can call this freely.
pub fn init(config: TelemetryConfig) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.default_level))
            .expect("failed to build env filter");

        let registry = tracing_subscriber::registry().with(filter);

        if config.json {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_current_span(true),
                )
                .init();
        } else {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(true)
                        .with_thread_ids(true)
                        .with_line_number(true),
                )
                .init();
        }

        tracing::info!(
            service.name = config.service_name,
            log.level = config.default_level,
            log.json = config.json,
            "telemetry initialized"
        );
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init(TelemetryConfig::new("test-service"));
        init(TelemetryConfig::new("test-service"));
    }

    #[test]
    fn from_env_defaults_when_unset() {
        // SAFETY: test runs single-threaded within this module; no other test mutates these vars.
        unsafe {
            std::env::remove_var("SERVICE_NAME");
            std::env::remove_var("LOG_LEVEL");
            std::env::remove_var("LOG_FORMAT");
        }
        let cfg = TelemetryConfig::from_env();
        assert_eq!(cfg.service_name, "modelgate-server");
        assert_eq!(cfg.default_level, "info");
        assert!(!cfg.json);
    }
}
