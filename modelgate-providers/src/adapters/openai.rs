//! OpenAI Chat Completions adapter.
//!
//! Grounded on `CloudLLM-ai-cloudllm/src/cloudllm/clients/openai.rs`'s request-shaping and
//! `caelator-openclaw/keyvault/src/adapters/openai.rs`'s plain-`reqwest`-plus-`serde_json::Value`
//! response parsing style — simpler than pulling in a dedicated OpenAI SDK crate for five fields.

use crate::client::{ProviderClient, ProviderResponse, classify_http_status};
use crate::tokenizer::estimate_tokens;
use async_trait::async_trait;
use modelgate_core::{ChatCompletionRequest, GatewayError, ProviderKind, Role};
use std::time::Duration;

const BASE_URL: &str = "https://api.openai.com/v1/chat/completions";

pub struct OpenAiAdapter {
    http: reqwest::Client,
}

impl OpenAiAdapter {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ProviderClient for OpenAiAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    fn supports(&self, model: &str) -> bool {
        let m = model.to_lowercase();
        m.starts_with("gpt-") || m.starts_with("o1") || m.starts_with("o3") || m.starts_with("o4")
            || m.starts_with("chatgpt-")
    }

    async fn chat_complete(
        &self,
        request: &ChatCompletionRequest,
        api_key: &str,
        timeout: Duration,
    ) -> Result<ProviderResponse, GatewayError> {
        let messages: Vec<serde_json::Value> = request
            .messages
            .iter()
            .map(|m| serde_json::json!({"role": role_str(m.role), "content": m.content}))
            .collect();

        let mut body = serde_json::json!({
            "model": request.model,
            "messages": messages,
        });
        if let Some(t) = request.temperature {
            body["temperature"] = serde_json::json!(t);
        }
        if let Some(p) = request.top_p {
            body["top_p"] = serde_json::json!(p);
        }
        if let Some(mt) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(mt);
        }
        if let Some(fp) = request.frequency_penalty {
            body["frequency_penalty"] = serde_json::json!(fp);
        }
        if let Some(pp) = request.presence_penalty {
            body["presence_penalty"] = serde_json::json!(pp);
        }

        let send = self.http.post(BASE_URL).bearer_auth(api_key).json(&body).send();

        let response = tokio::time::timeout(timeout, send)
            .await
            .map_err(|_| GatewayError::ProviderTransient {
                provider: "openai".to_string(),
                message: "request timed out".to_string(),
            })?
            .map_err(|e| GatewayError::ProviderTransient { provider: "openai".to_string(), message: e.to_string() })?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            let body_text = response.text().await.unwrap_or_default();
            return Err(classify_http_status("openai", status, &body_text));
        }

        let parsed: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GatewayError::ProviderTransient { provider: "openai".to_string(), message: e.to_string() })?;

        let content = parsed["choices"][0]["message"]["content"].as_str().unwrap_or("").to_string();
        let prompt_tokens = parsed["usage"]["prompt_tokens"].as_u64();
        let completion_tokens = parsed["usage"]["completion_tokens"].as_u64();

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
            .get("https://api.openai.com/v1/models")
            .bearer_auth(api_key)
            .send()
            .await
            .map_err(|e| GatewayError::ProviderTransient { provider: "openai".to_string(), message: e.to_string() })?;
        let status = response.status().as_u16();
        if (200..300).contains(&status) {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(classify_http_status("openai", status, &body))
        }
    }
}

fn role_str(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}
