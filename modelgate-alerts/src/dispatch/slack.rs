//! Slack incoming-webhook dispatcher. Grounded on `caelator-openclaw/keyvault`'s adapters'
//! bearer-free JSON POST shape — Slack's webhook URL already embeds the auth token.

use super::{DispatchError, NotificationDispatcher, missing_field};
use crate::payload::NotificationPayload;
use async_trait::async_trait;
use modelgate_core::ChannelConfig;

pub struct SlackDispatcher {
    http: reqwest::Client,
}

impl SlackDispatcher {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl NotificationDispatcher for SlackDispatcher {
    async fn send(&self, config: &ChannelConfig, payload: &NotificationPayload) -> Result<(), DispatchError> {
        let webhook_url = config
            .get("webhook_url")
            .and_then(|v| v.as_str())
            .ok_or_else(|| missing_field("webhook_url"))?;

        let body = serde_json::json!({ "text": payload.message() });

        let response = self
            .http
            .post(webhook_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| DispatchError { message: format!("slack post failed: {e}"), retriable: true })?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            Err(DispatchError {
                message: format!("slack webhook returned {status}"),
                retriable: status.is_server_error(),
            })
        }
    }
}
