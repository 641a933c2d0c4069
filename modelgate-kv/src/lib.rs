//! Key-value store client: atomic counters, short-TTL cache, and prefix deletes.
//!
//! `modelgate-ratelimit` and the hot side of `modelgate-cache` both depend on [`KvStore`]
//! rather than on `fred` directly, so every caller treats KV unavailability as a soft
//! dependency per SPEC_FULL.md §4.A — a failing KV call degrades the caller, it never panics.

mod memory;
mod redis;

pub use memory::InMemoryKv;
pub use redis::{RedisKv, RedisKvConfig};

use async_trait::async_trait;
use modelgate_core::GatewayError;
use std::time::Duration;

/// Deadline applied to every KV round trip. Callers that need a different deadline pass their
/// own via [`KvStore::with_timeout`]-style wrapping; the default matches the provider call
/// timeout floor used elsewhere in the pipeline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(200);

#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, GatewayError>;

    async fn setex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), GatewayError>;

    /// Atomically increments `key` and ensures it carries `ttl` from its first write, in a
    /// single round trip. Returns the value *after* the increment.
    async fn incr_with_expiry(&self, key: &str, ttl: Duration) -> Result<i64, GatewayError>;

    async fn del_prefix(&self, prefix: &str) -> Result<u64, GatewayError>;

    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<(), GatewayError>;

    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>, GatewayError>;

    async fn ping(&self) -> Result<(), GatewayError>;
}
