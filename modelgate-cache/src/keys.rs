//! KV key layout per SPEC_FULL.md §6: `cache:{tenant}:{fingerprint}`.

use modelgate_core::{Fingerprint, TenantId};

pub fn hot_cache_key(tenant_id: TenantId, fingerprint: &Fingerprint) -> String {
    format!("cache:{tenant_id}:{fingerprint}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_layout_matches_spec() {
        let tenant_id = TenantId::new();
        let fp = Fingerprint::from_hex("deadbeef");
        let key = hot_cache_key(tenant_id, &fp);
        assert_eq!(key, format!("cache:{tenant_id}:deadbeef"));
    }
}
