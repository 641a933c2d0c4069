//! Google Gemini `generateContent` adapter.
//!
//! Grounded on `adk-gemini/src/backend/studio.rs`'s Gemini Developer API (API-key) path:
//! `x-goog-api-key` header and `models/{model}:generateContent` URL shape. The teacher's
//! service-account/Vertex path (JWT minting, OAuth token cache) is not reused — this adapter is
//! the plain REST API-key path only, matching the rest of this crate's adapters.

use crate::client::{ProviderClient, ProviderResponse, classify_http_status};
use crate::tokenizer::estimate_tokens;
use async_trait::async_trait;
use modelgate_core::{ChatCompletionRequest, GatewayError, ProviderKind, Role};
use std::time::Duration;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GoogleAdapter {
    http: reqwest::Client,
}

impl GoogleAdapter {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ProviderClient for GoogleAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Google
    }

    fn supports(&self, model: &str) -> bool {
        model.to_lowercase().starts_with("gemini")
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

        let contents: Vec<serde_json::Value> = request
            .messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| {
                serde_json::json!({
                    "role": if m.role == Role::Assistant { "model" } else { "user" },
                    "parts": [{"text": m.content}],
                })
            })
            .collect();

        let mut generation_config = serde_json::json!({});
        if let Some(t) = request.temperature {
            generation_config["temperature"] = serde_json::json!(t);
        }
        if let Some(p) = request.top_p {
            generation_config["topP"] = serde_json::json!(p);
        }
        if let Some(mt) = request.max_tokens {
            generation_config["maxOutputTokens"] = serde_json::json!(mt);
        }

        let mut body = serde_json::json!({ "contents": contents });
        if let Some(sys) = system {
            body["systemInstruction"] = serde_json::json!({"parts": [{"text": sys}]});
        }
        if generation_config.as_object().map(|o| !o.is_empty()).unwrap_or(false) {
            body["generationConfig"] = generation_config;
        }

        let url = format!("{BASE_URL}/models/{}:generateContent", request.model);
        let send = self.http.post(&url).header("x-goog-api-key", api_key).json(&body).send();

        let response = tokio::time::timeout(timeout, send)
            .await
            .map_err(|_| GatewayError::ProviderTransient {
                provider: "google".to_string(),
                message: "request timed out".to_string(),
            })?
            .map_err(|e| GatewayError::ProviderTransient { provider: "google".to_string(), message: e.to_string() })?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            let body_text = response.text().await.unwrap_or_default();
            return Err(classify_http_status("google", status, &body_text));
        }

        let parsed: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GatewayError::ProviderTransient { provider: "google".to_string(), message: e.to_string() })?;

        let content = parsed["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .unwrap_or("")
            .to_string();
        let prompt_tokens = parsed["usageMetadata"]["promptTokenCount"].as_u64();
        let completion_tokens = parsed["usageMetadata"]["candidatesTokenCount"].as_u64();

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
        let url = format!("{BASE_URL}/models");
        let response = self
            .http
            .get(&url)
            .header("x-goog-api-key", api_key)
            .send()
            .await
            .map_err(|e| GatewayError::ProviderTransient { provider: "google".to_string(), message: e.to_string() })?;
        let status = response.status().as_u16();
        if (200..300).contains(&status) {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(classify_http_status("google", status, &body))
        }
    }
}
