pub mod alerts;
pub mod cache_cold;
pub mod provider_configs;
pub mod rate_limits;
pub mod tenants;
pub mod usage_log;
