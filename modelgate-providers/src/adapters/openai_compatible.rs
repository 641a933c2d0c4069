//! Generic adapter for providers that speak the OpenAI Chat Completions wire format verbatim.
//!
//! Mistral and Groq are both OpenAI-compatible at this level, so rather than duplicating
//! `openai.rs` twice we parameterize by base URL, auth header, and `ProviderKind` — same pattern
//! `caelator-openclaw/keyvault`'s adapter set uses for its Groq/Mistral variants.

use crate::client::{ProviderClient, ProviderResponse, classify_http_status};
use crate::tokenizer::estimate_tokens;
use async_trait::async_trait;
use modelgate_core::{ChatCompletionRequest, GatewayError, ProviderKind, Role};
use std::time::Duration;

pub struct OpenAiCompatibleAdapter {
    http: reqwest::Client,
    kind: ProviderKind,
    base_url: String,
    model_prefixes: &'static [&'static str],
}

impl OpenAiCompatibleAdapter {
    pub fn mistral(http: reqwest::Client) -> Self {
        Self {
            http,
            kind: ProviderKind::Mistral,
            base_url: "https://api.mistral.ai/v1/chat/completions".to_string(),
            model_prefixes: &["mistral", "codestral", "ministral", "pixtral"],
        }
    }

    pub fn groq(http: reqwest::Client) -> Self {
        Self {
            http,
            kind: ProviderKind::Groq,
            base_url: "https://api.groq.com/openai/v1/chat/completions".to_string(),
            model_prefixes: &["llama", "gemma", "mixtral", "groq"],
        }
    }

    fn name(&self) -> &'static str {
        self.kind.as_str()
    }
}

#[async_trait]
impl ProviderClient for OpenAiCompatibleAdapter {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn supports(&self, model: &str) -> bool {
        let m = model.to_lowercase();
        self.model_prefixes.iter().any(|p| m.starts_with(p))
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

        let send = self.http.post(&self.base_url).bearer_auth(api_key).json(&body).send();

        let response = tokio::time::timeout(timeout, send)
            .await
            .map_err(|_| GatewayError::ProviderTransient {
                provider: self.name().to_string(),
                message: "request timed out".to_string(),
            })?
            .map_err(|e| GatewayError::ProviderTransient { provider: self.name().to_string(), message: e.to_string() })?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            let body_text = response.text().await.unwrap_or_default();
            return Err(classify_http_status(self.name(), status, &body_text));
        }

        let parsed: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GatewayError::ProviderTransient { provider: self.name().to_string(), message: e.to_string() })?;

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
        let models_url = self.base_url.replace("/chat/completions", "/models");
        let response = self
            .http
            .get(&models_url)
            .bearer_auth(api_key)
            .send()
            .await
            .map_err(|e| GatewayError::ProviderTransient { provider: self.name().to_string(), message: e.to_string() })?;
        let status = response.status().as_u16();
        if (200..300).contains(&status) {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(classify_http_status(self.name(), status, &body))
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mistral_supports_mistral_models() {
        let adapter = OpenAiCompatibleAdapter::mistral(reqwest::Client::new());
        assert!(adapter.supports("mistral-large-latest"));
        assert!(!adapter.supports("llama-3.1-70b"));
    }

    #[test]
    fn groq_supports_llama_models() {
        let adapter = OpenAiCompatibleAdapter::groq(reqwest::Client::new());
        assert!(adapter.supports("llama-3.1-70b-versatile"));
        assert!(!adapter.supports("mistral-large-latest"));
    }
}
