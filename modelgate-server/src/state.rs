//! Shared application state, constructed once in `main` and cloned (cheaply — everything inside
//! is an `Arc` or an already-`Clone` wrapper over one) into every request's extractor.

use modelgate_cache::TwoTierCache;
use modelgate_kv::KvStore;
use modelgate_ledger::Ledger;
use modelgate_pipeline::Pipeline;
use modelgate_providers::ProviderKeyCipher;
use modelgate_ratelimit::RateLimiter;
use modelgate_store::Store;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub kv: Arc<dyn KvStore>,
    /// A second `TwoTierCache` instance over the same backing `kv`/`store`, used by the admin
    /// `/cache/*` routes directly. `Pipeline::new` takes its own owned instance, and neither
    /// wrapper holds state beyond the shared clients it wraps, so constructing two is cheap and
    /// avoids threading a cache handle back out of the pipeline.
    pub cache: Arc<TwoTierCache>,
    pub rate_limiter: Arc<RateLimiter>,
    pub ledger: Ledger,
    pub cipher: ProviderKeyCipher,
    pub pipeline: Arc<Pipeline>,
}
