//! In-process `KvStore` used by tests and by local/dev runs without a Redis instance.
//!
//! Mirrors `adk-session::InMemorySessionService`'s `Arc<RwLock<HashMap<...>>>` shape: a single
//! lock guards a map of key to (value, expiry), with lazy expiry checked on read.

use crate::KvStore;
use async_trait::async_trait;
use modelgate_core::GatewayError;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self) -> bool {
        self.expires_at.map(|at| Instant::now() < at).unwrap_or(true)
    }
}

/// In-memory `KvStore`. Never returns an error from `GatewayError::KvUnavailable` — this
/// implementation is used precisely when callers want to bypass soft-dependency degradation.
#[derive(Default)]
pub struct InMemoryKv {
    data: RwLock<HashMap<String, Entry>>,
    hashes: RwLock<HashMap<String, HashMap<String, String>>>,
}

impl InMemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for InMemoryKv {
    async fn get(&self, key: &str) -> Result<Option<String>, GatewayError> {
        let guard = self.data.read().unwrap();
        Ok(guard.get(key).filter(|e| e.is_live()).map(|e| e.value.clone()))
    }

    async fn setex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), GatewayError> {
        let mut guard = self.data.write().unwrap();
        guard.insert(
            key.to_string(),
            Entry { value: value.to_string(), expires_at: Some(Instant::now() + ttl) },
        );
        Ok(())
    }

    async fn incr_with_expiry(&self, key: &str, ttl: Duration) -> Result<i64, GatewayError> {
        let mut guard = self.data.write().unwrap();
        let entry = guard.entry(key.to_string()).or_insert_with(|| Entry {
            value: "0".to_string(),
            expires_at: Some(Instant::now() + ttl),
        });
        if !entry.is_live() {
            entry.value = "0".to_string();
            entry.expires_at = Some(Instant::now() + ttl);
        }
        let next: i64 = entry.value.parse().unwrap_or(0) + 1;
        entry.value = next.to_string();
        Ok(next)
    }

    async fn del_prefix(&self, prefix: &str) -> Result<u64, GatewayError> {
        let mut guard = self.data.write().unwrap();
        let to_remove: Vec<String> =
            guard.keys().filter(|k| k.starts_with(prefix)).cloned().collect();
        for k in &to_remove {
            guard.remove(k);
        }
        Ok(to_remove.len() as u64)
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<(), GatewayError> {
        let mut guard = self.hashes.write().unwrap();
        guard.entry(key.to_string()).or_default().insert(field.to_string(), value.to_string());
        Ok(())
    }

    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>, GatewayError> {
        let guard = self.hashes.read().unwrap();
        Ok(guard.get(key).and_then(|m| m.get(field)).cloned())
    }

    async fn ping(&self) -> Result<(), GatewayError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn incr_with_expiry_accumulates() {
        let kv = InMemoryKv::new();
        assert_eq!(kv.incr_with_expiry("a", Duration::from_secs(60)).await.unwrap(), 1);
        assert_eq!(kv.incr_with_expiry("a", Duration::from_secs(60)).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn setex_then_get_round_trips() {
        let kv = InMemoryKv::new();
        kv.setex("k", "v", Duration::from_secs(60)).await.unwrap();
        assert_eq!(kv.get("k").await.unwrap(), Some("v".to_string()));
    }

    #[tokio::test]
    async fn expired_entry_reads_as_absent() {
        let kv = InMemoryKv::new();
        kv.setex("k", "v", Duration::from_millis(1)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(kv.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn del_prefix_removes_matching_keys_only() {
        let kv = InMemoryKv::new();
        kv.setex("cache:t1:a", "1", Duration::from_secs(60)).await.unwrap();
        kv.setex("cache:t1:b", "2", Duration::from_secs(60)).await.unwrap();
        kv.setex("cache:t2:a", "3", Duration::from_secs(60)).await.unwrap();
        let removed = kv.del_prefix("cache:t1:").await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(kv.get("cache:t2:a").await.unwrap(), Some("3".to_string()));
    }

    #[tokio::test]
    async fn hset_hget_round_trip() {
        let kv = InMemoryKv::new();
        kv.hset("stats:t1", "hits", "5").await.unwrap();
        assert_eq!(kv.hget("stats:t1", "hits").await.unwrap(), Some("5".to_string()));
        assert_eq!(kv.hget("stats:t1", "misses").await.unwrap(), None);
    }
}
