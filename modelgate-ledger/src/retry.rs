//! Bounded retry queue for usage-log writes that failed because the store was momentarily
//! unavailable, per SPEC_FULL.md §7's `StoreWriteFailed` row: log and enqueue for retry, never
//! block the client on it. Grounded on `adk-runner/src/cache.rs`'s background-eviction task shape
//! — a `tokio::time::interval` loop selected against a `CancellationToken`.

use modelgate_core::UsageRecord;
use modelgate_store::Store;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Past this many queued records, the oldest are dropped to bound memory use. A sustained store
/// outage loses usage-ledger fidelity rather than the process's memory budget.
const MAX_QUEUED: usize = 10_000;

const RETRY_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Default)]
pub struct RetryQueue {
    inner: Mutex<VecDeque<UsageRecord>>,
}

impl RetryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, record: UsageRecord) {
        let mut guard = self.inner.lock().unwrap();
        if guard.len() >= MAX_QUEUED {
            guard.pop_front();
            warn!("usage ledger retry queue full, dropping oldest record");
        }
        guard.push_back(record);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    fn drain(&self) -> Vec<UsageRecord> {
        let mut guard = self.inner.lock().unwrap();
        guard.drain(..).collect()
    }

    fn requeue_front(&self, records: Vec<UsageRecord>) {
        let mut guard = self.inner.lock().unwrap();
        for record in records.into_iter().rev() {
            guard.push_front(record);
        }
    }
}

/// Runs until `shutdown` fires, periodically retrying queued records against `store`. Intended to
/// be spawned once from `modelgate-server`'s `main` alongside the alert evaluator.
pub async fn run(queue: std::sync::Arc<RetryQueue>, store: Store, shutdown: CancellationToken) {
    let mut ticker = tokio::time::interval(RETRY_INTERVAL);
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("usage ledger retry task shutting down, {} records still queued", queue.len());
                return;
            }
            _ = ticker.tick() => {
                let pending = queue.drain();
                if pending.is_empty() {
                    continue;
                }
                let mut failed = Vec::new();
                for record in pending {
                    if let Err(e) = store.insert_usage_record(&record).await {
                        warn!(error = %e, "usage ledger retry still failing");
                        failed.push(record);
                    }
                }
                if !failed.is_empty() {
                    queue.requeue_front(failed);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelgate_core::{CacheSource, ProviderKind, TenantId};
    use uuid::Uuid;

    fn sample_record() -> UsageRecord {
        UsageRecord {
            id: Uuid::new_v4(),
            tenant_id: TenantId::new(),
            ts: chrono::Utc::now(),
            model: "gpt-4o-mini".to_string(),
            provider: ProviderKind::OpenAi,
            prompt_tokens: 10,
            completion_tokens: 5,
            cost_usd: 0.001,
            latency_ms: 120,
            cache_source: CacheSource::None,
            fingerprint: "abc".to_string(),
            routing_decision: None,
        }
    }

    #[test]
    fn push_then_drain_round_trips() {
        let queue = RetryQueue::new();
        queue.push(sample_record());
        assert_eq!(queue.len(), 1);
        let drained = queue.drain();
        assert_eq!(drained.len(), 1);
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn overflow_drops_oldest_entry() {
        let queue = RetryQueue::new();
        for _ in 0..MAX_QUEUED + 5 {
            queue.push(sample_record());
        }
        assert_eq!(queue.len(), MAX_QUEUED);
    }
}
