//! Canonical domain types shared by every ModelGate crate.
//!
//! Newtype identifiers follow the same `derive_more`-based pattern throughout: a thin wrapper
//! around `String`/`Uuid` that gets `Display`, `From`, `AsRef`, and `Deref` for free instead of
//! threading bare strings through the whole call graph.

use chrono::{DateTime, Utc};
use derive_more::{AsRef, Deref, Display, From};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, From, AsRef, Deref, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(Uuid);

impl TenantId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TenantId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, From, AsRef, Deref, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderConfigId(Uuid);

impl ProviderConfigId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ProviderConfigId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, From, AsRef, Deref, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertChannelId(Uuid);

impl AlertChannelId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AlertChannelId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, From, AsRef, Deref, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }
}

/// The five upstream LLM providers ModelGate can forward requests to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
    Mistral,
    Groq,
    Google,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Mistral => "mistral",
            ProviderKind::Groq => "groq",
            ProviderKind::Google => "google",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openai" => Ok(ProviderKind::OpenAi),
            "anthropic" => Ok(ProviderKind::Anthropic),
            "mistral" => Ok(ProviderKind::Mistral),
            "groq" => Ok(ProviderKind::Groq),
            "google" => Ok(ProviderKind::Google),
            other => Err(format!("unknown provider kind '{other}'")),
        }
    }
}

/// Where a served response actually came from — used for the `X-ModelGate-Cache` header and
/// for zeroing out cost on the usage ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheSource {
    None,
    Hot,
    Cold,
}

/// A single chat message in the canonical request/response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self { role, content: content.into(), name: None }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// The objective the smart router optimizes model selection for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizeFor {
    Cost,
    Latency,
    Quality,
}

impl Default for OptimizeFor {
    fn default() -> Self {
        OptimizeFor::Cost
    }
}

/// Complexity class assigned to a prompt by the router's rule-based classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Simple,
    Medium,
    Complex,
}

/// Canonical chat-completion request, independent of any one provider's wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
}

/// Token/cost accounting produced by a provider adapter for one completed request.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub cost_usd: f64,
}

impl Usage {
    pub fn total_tokens(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// One alternative the router considered but did not choose, surfaced for auditability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingAlternative {
    pub model: String,
    pub provider: ProviderKind,
    pub reason_not_selected: String,
}

/// Attached to a `ChatCompletionResponse` (and persisted on the `UsageRecord`) whenever the
/// request went through `/v1/smart/completions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub complexity: Complexity,
    pub optimize_for: OptimizeFor,
    pub chosen_model: String,
    pub chosen_provider: ProviderKind,
    pub rationale: String,
    pub alternatives: Vec<RoutingAlternative>,
}

/// Canonical chat-completion response returned to the client, OpenAI-schema compatible plus a
/// ModelGate-specific extension object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    pub id: String,
    pub model: String,
    pub message: ChatMessage,
    pub usage: Usage,
    pub modelgate: ResponseMeta,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseMeta {
    pub cached: CacheSource,
    pub cost_usd: f64,
    pub provider: ProviderKind,
    pub fingerprint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing: Option<RoutingDecision>,
}

/// A tenant's stored credential and routing priority for one upstream provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub id: ProviderConfigId,
    pub tenant_id: TenantId,
    pub provider: ProviderKind,
    /// AES-256-GCM ciphertext, base64-encoded. Never logged or returned to clients.
    pub api_key_encrypted: String,
    pub priority: u32,
    pub enabled: bool,
}

/// Per-tenant rate limit configuration. Absent rows fall back to `RateLimitConfig::default()`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub per_minute: u32,
    pub per_hour: u32,
    pub per_day: u32,
    pub enabled: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self { per_minute: 100, per_hour: 3_000, per_day: 50_000, enabled: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateWindow {
    Minute,
    Hour,
    Day,
}

impl RateWindow {
    pub fn all() -> [RateWindow; 3] {
        [RateWindow::Minute, RateWindow::Hour, RateWindow::Day]
    }

    pub fn duration_seconds(&self) -> i64 {
        match self {
            RateWindow::Minute => 60,
            RateWindow::Hour => 3_600,
            RateWindow::Day => 86_400,
        }
    }
}

/// Outcome of one rate-limit check for a single window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RateWindowUsage {
    pub window: RateWindow,
    pub used: u32,
    pub limit: u32,
    pub remaining: u32,
}

/// Append-only usage ledger row. One per served (or denied-after-charge) request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageRecord {
    pub id: Uuid,
    pub tenant_id: TenantId,
    pub ts: DateTime<Utc>,
    pub model: String,
    pub provider: ProviderKind,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub cost_usd: f64,
    pub latency_ms: u64,
    pub cache_source: CacheSource,
    pub fingerprint: String,
    pub routing_decision: Option<RoutingDecision>,
}

/// Static per-model characteristics consulted by the smart router.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelProfile {
    pub provider: ProviderKind,
    pub model: String,
    pub cost_per_1k_input: f64,
    pub cost_per_1k_output: f64,
    pub typical_latency_ms: u32,
    pub quality_score: f32,
    pub suitable_complexities: Vec<Complexity>,
}

/// Free-form per-channel configuration, stored as JSON and interpreted by `modelgate-alerts`.
pub type ChannelConfig = HashMap<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertChannelKind {
    Slack,
    Email,
    Webhook,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenant_id_round_trips_through_json() {
        let id = TenantId::new();
        let json = serde_json::to_string(&id).unwrap();
        let back: TenantId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }

    #[test]
    fn provider_kind_from_str_round_trips() {
        for kind in [
            ProviderKind::OpenAi,
            ProviderKind::Anthropic,
            ProviderKind::Mistral,
            ProviderKind::Groq,
            ProviderKind::Google,
        ] {
            let parsed: ProviderKind = kind.as_str().parse().unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn rate_limit_defaults_match_spec() {
        let cfg = RateLimitConfig::default();
        assert_eq!(cfg.per_minute, 100);
        assert_eq!(cfg.per_hour, 3_000);
        assert_eq!(cfg.per_day, 50_000);
    }
}
