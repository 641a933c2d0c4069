//! Anthropic Messages API adapter.
//!
//! Grounded on `caelator-openclaw/keyvault/src/adapters/anthropic.rs`: `x-api-key` +
//! `anthropic-version` headers, system prompt pulled out of the message list into its own field.

use crate::client::{ProviderClient, ProviderResponse, classify_http_status};
use crate::tokenizer::estimate_tokens;
use async_trait::async_trait;
use modelgate_core::{ChatCompletionRequest, GatewayError, ProviderKind, Role};
use std::time::Duration;

const BASE_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct AnthropicAdapter {
    http: reqwest::Client,
}

impl AnthropicAdapter {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ProviderClient for AnthropicAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    fn supports(&self, model: &str) -> bool {
        model.to_lowercase().starts_with("claude")
    }

    async fn chat_complete(
        &self,
        request: &ChatCompletionRequest,
        api_key: &str,
        timeout: Duration,
    ) -> Result<ProviderResponse, GatewayError> {
        let system: Option<String> = request
            .messages
            .iter()
            .find(|m| m.role == Role::System)
            .map(|m| m.content.clone());

        let messages: Vec<serde_json::Value> = request
            .messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| {
                serde_json::json!({
                    "role": if m.role == Role::Assistant { "assistant" } else { "user" },
                    "content": m.content,
                })
            })
            .collect();

        let mut body = serde_json::json!({
            "model": request.model,
            "messages": messages,
            "max_tokens": request.max_tokens.unwrap_or(4096),
        });
        if let Some(sys) = system {
            body["system"] = serde_json::json!(sys);
        }
        if let Some(t) = request.temperature {
            body["temperature"] = serde_json::json!(t);
        }
        if let Some(p) = request.top_p {
            body["top_p"] = serde_json::json!(p);
        }

        let send = self
            .http
            .post(BASE_URL)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send();

        let response = tokio::time::timeout(timeout, send)
            .await
            .map_err(|_| GatewayError::ProviderTransient {
                provider: "anthropic".to_string(),
                message: "request timed out".to_string(),
            })?
            .map_err(|e| GatewayError::ProviderTransient { provider: "anthropic".to_string(), message: e.to_string() })?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            let body_text = response.text().await.unwrap_or_default();
            return Err(classify_http_status("anthropic", status, &body_text));
        }

        let parsed: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GatewayError::ProviderTransient { provider: "anthropic".to_string(), message: e.to_string() })?;

        let content = parsed["content"][0]["text"].as_str().unwrap_or("").to_string();
        let prompt_tokens = parsed["usage"]["input_tokens"].as_u64();
        let completion_tokens = parsed["usage"]["output_tokens"].as_u64();

        Ok(ProviderResponse {
            prompt_tokens: prompt_tokens.unwrap_or_else(|| {
                estimate_tokens(&request.model, &request.messages.iter().map(|m| m.content.as_str()).collect::<Vec<_>>().join(" "))
            }),
            completion_tokens: completion_tokens.unwrap_or_else(|| estimate_tokens(&request.model, &content)),
            model: request.model.clone(),
            content,
        })
    }

    async fn test_credentials(&self, api_key: &str) -> Result<(), GatewayError> {
        let response = self
            .http
            .post(BASE_URL)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&serde_json::json!({
                "model": "claude-haiku-4-20250514",
                "max_tokens": 1,
                "messages": [{"role": "user", "content": "hi"}],
            }))
            .send()
            .await
            .map_err(|e| GatewayError::ProviderTransient { provider: "anthropic".to_string(), message: e.to_string() })?;

        let status = response.status().as_u16();
        if (200..300).contains(&status) {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(classify_http_status("anthropic", status, &body))
        }
    }
}
