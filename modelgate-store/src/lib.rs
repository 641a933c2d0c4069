//! PostgreSQL-backed relational store for every durable entity in SPEC_FULL.md §3.
//!
//! One `sqlx` query module per entity family, each returning typed rows mapped with `FromRow`
//! rather than raw `serde_json::Value` — the exceptions are the genuinely free-form JSON columns
//! (`routing_decision_json`, alert threshold/config blobs).

pub mod queries;
mod rows;

pub use queries::cache_cold::CacheStats;
pub use rows::*;

use modelgate_core::GatewayError;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Thin wrapper around a pooled Postgres connection. Cloning is cheap (`PgPool` is an `Arc`
/// internally); every component crate that needs durable storage holds one of these.
#[derive(Clone)]
pub struct Store {
    pool: PgPool,
}

impl Store {
    /// Connect and run pending migrations. Called once at process start in `modelgate-server`.
    pub async fn connect(dsn: &str, max_connections: u32) -> Result<Self, GatewayError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(dsn)
            .await
            .map_err(|e| GatewayError::StoreError(format!("connect failed: {e}")))?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| GatewayError::StoreError(format!("migration failed: {e}")))?;

        Ok(Self { pool })
    }

    #[cfg(any(test, feature = "test-util"))]
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn ping(&self) -> Result<(), GatewayError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| GatewayError::StoreError(format!("ping failed: {e}")))
    }
}
