//! `fred`-backed `KvStore` speaking to a single logical Redis endpoint.
//!
//! Every operation is wrapped in `tokio::time::timeout` against a caller-supplied deadline; any
//! timeout, connection failure, or protocol error collapses to `GatewayError::KvUnavailable` so
//! every caller in the pipeline can treat the KV as a soft dependency, per SPEC_FULL.md §4.A.

use crate::KvStore;
use async_trait::async_trait;
use fred::prelude::*;
use modelgate_core::GatewayError;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RedisKvConfig {
    pub url: String,
    pub timeout: Duration,
}

impl RedisKvConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), timeout: crate::DEFAULT_TIMEOUT }
    }
}

/// Atomic `INCR` + conditional `EXPIRE` in a single round trip, so two concurrent callers against
/// the same bucket key never race on setting the TTL only once.
const INCR_WITH_EXPIRY_SCRIPT: &str = r#"
local v = redis.call('INCR', KEYS[1])
if v == 1 then
  redis.call('EXPIRE', KEYS[1], ARGV[1])
end
return v
"#;

pub struct RedisKv {
    client: Client,
    timeout: Duration,
}

impl RedisKv {
    pub async fn connect(config: RedisKvConfig) -> Result<Self, GatewayError> {
        let client_config = Config::from_url(&config.url)
            .map_err(|e| GatewayError::KvUnavailable(format!("invalid redis url: {e}")))?;
        let client = Builder::from_config(client_config)
            .build()
            .map_err(|e| GatewayError::KvUnavailable(format!("failed to build redis client: {e}")))?;
        client.connect();
        client
            .wait_for_connect()
            .await
            .map_err(|e| GatewayError::KvUnavailable(format!("redis connect failed: {e}")))?;
        Ok(Self { client, timeout: config.timeout })
    }

    async fn with_timeout<T, F>(&self, fut: F) -> Result<T, GatewayError>
    where
        F: std::future::Future<Output = Result<T, RedisError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(v)) => Ok(v),
            Ok(Err(e)) => Err(GatewayError::KvUnavailable(e.to_string())),
            Err(_) => Err(GatewayError::KvUnavailable("timed out".to_string())),
        }
    }
}

#[async_trait]
impl KvStore for RedisKv {
    async fn get(&self, key: &str) -> Result<Option<String>, GatewayError> {
        self.with_timeout(self.client.get(key)).await
    }

    async fn setex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), GatewayError> {
        self.with_timeout(self.client.setex(key, value, ttl.as_secs())).await
    }

    async fn incr_with_expiry(&self, key: &str, ttl: Duration) -> Result<i64, GatewayError> {
        let ttl_secs = ttl.as_secs().to_string();
        self.with_timeout(self.client.eval(INCR_WITH_EXPIRY_SCRIPT, vec![key.to_string()], vec![ttl_secs]))
            .await
    }

    async fn del_prefix(&self, prefix: &str) -> Result<u64, GatewayError> {
        let pattern = format!("{prefix}*");
        let keys: Vec<String> = self.with_timeout(self.client.keys(&pattern)).await?;
        if keys.is_empty() {
            return Ok(0);
        }
        self.with_timeout(self.client.del(keys)).await
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<(), GatewayError> {
        self.with_timeout(self.client.hset(key, (field, value))).await
    }

    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>, GatewayError> {
        self.with_timeout(self.client.hget(key, field)).await
    }

    async fn ping(&self) -> Result<(), GatewayError> {
        self.with_timeout(self.client.ping()).await
    }
}
