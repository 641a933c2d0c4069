//! Process configuration, read once at startup from the environment (optionally loaded from a
//! `.env` file via `dotenvy`), per SPEC_FULL.md §4.L.

use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub database_max_connections: u32,
    pub redis_url: String,
    pub provider_secret_key: String,
    pub hot_cache_ttl: Duration,
    pub request_timeout: Duration,
    pub alert_tick_interval: Duration,
    pub smtp: Option<SmtpEnvConfig>,
}

#[derive(Debug, Clone)]
pub struct SmtpEnvConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

fn env_var(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("missing required environment variable {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

impl AppConfig {
    /// Loads `.env` if present (missing is not an error — matches the teacher's convention of
    /// treating `.env` as a developer convenience, not a deployment requirement), then reads
    /// every setting from the process environment.
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();

        let bind_addr = env_or("BIND_ADDR", "0.0.0.0:8080")
            .parse()
            .map_err(|e| format!("invalid BIND_ADDR: {e}"))?;

        let smtp = if std::env::var("SMTP_HOST").is_ok() {
            Some(SmtpEnvConfig {
                host: env_var("SMTP_HOST")?,
                port: env_parse_or("SMTP_PORT", 587u16),
                username: env_var("SMTP_USERNAME")?,
                password: env_var("SMTP_PASSWORD")?,
                from: env_var("SMTP_FROM")?,
            })
        } else {
            None
        };

        Ok(Self {
            bind_addr,
            database_url: env_var("DATABASE_URL")?,
            database_max_connections: env_parse_or("DATABASE_MAX_CONNECTIONS", 10u32),
            redis_url: env_var("REDIS_URL")?,
            provider_secret_key: env_var("PROVIDER_SECRET_KEY")?,
            hot_cache_ttl: Duration::from_secs(env_parse_or("HOT_CACHE_TTL_SECS", 300u64)),
            request_timeout: Duration::from_secs(env_parse_or("REQUEST_TIMEOUT_SECS", 60u64)),
            alert_tick_interval: Duration::from_secs(env_parse_or("ALERT_TICK_INTERVAL_SECS", 3_600u64)),
            smtp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_fails_loudly_on_missing_database_url() {
        // SAFETY: test runs single-threaded within this module; no other test mutates these vars.
        unsafe {
            std::env::remove_var("DATABASE_URL");
        }
        assert!(AppConfig::from_env().is_err());
    }
}
