//! Generic webhook dispatcher: POSTs the payload as JSON to a tenant-configured URL, with
//! optional extra headers. Grounded on the same `reqwest`-POST shape as `SlackDispatcher`, plus
//! an extra header-injection step the Slack webhook doesn't need.

use super::{DispatchError, NotificationDispatcher, missing_field};
use crate::payload::NotificationPayload;
use async_trait::async_trait;
use modelgate_core::ChannelConfig;

pub struct WebhookDispatcher {
    http: reqwest::Client,
}

impl WebhookDispatcher {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl NotificationDispatcher for WebhookDispatcher {
    async fn send(&self, config: &ChannelConfig, payload: &NotificationPayload) -> Result<(), DispatchError> {
        let url = config.get("url").and_then(|v| v.as_str()).ok_or_else(|| missing_field("url"))?;

        let body = serde_json::json!({
            "tenant_id": payload.tenant_id.to_string(),
            "kind": payload.kind,
            "current": payload.current,
            "limit": payload.limit,
            "window_start": payload.window_start,
            "window_end": payload.window_end,
            "is_summary": payload.is_summary,
            "message": payload.message(),
        });

        let mut request = self.http.post(url).json(&body);
        if let Some(headers) = config.get("headers").and_then(|v| v.as_object()) {
            for (name, value) in headers {
                if let Some(value) = value.as_str() {
                    request = request.header(name.as_str(), value);
                }
            }
        }

        let response = request
            .send()
            .await
            .map_err(|e| DispatchError { message: format!("webhook post failed: {e}"), retriable: true })?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            Err(DispatchError {
                message: format!("webhook returned {status}"),
                retriable: status.is_server_error(),
            })
        }
    }
}
