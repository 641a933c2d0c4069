//! SMTP STARTTLS email dispatcher, per SPEC_FULL.md §4.J. Grounded on the teacher's `lettre`
//! dependency (carried in `adk-studio`'s Cargo.toml, not its source — the teacher never wired it
//! up; this is new code in the teacher's chosen crate).

use super::{DispatchError, NotificationDispatcher, missing_field};
use crate::payload::NotificationPayload;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use modelgate_core::ChannelConfig;

/// Process-wide SMTP relay settings, loaded once from `AppConfig` — distinct from a channel's
/// per-tenant `to` address, which lives in the channel's own `config_json`.
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

pub struct EmailDispatcher {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl EmailDispatcher {
    pub fn new(settings: SmtpSettings) -> Result<Self, DispatchError> {
        let creds = Credentials::new(settings.username.clone(), settings.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
            .map_err(|e| DispatchError { message: format!("invalid SMTP host '{}': {e}", settings.host), retriable: false })?
            .port(settings.port)
            .credentials(creds)
            .build();
        Ok(Self { transport, from: settings.from })
    }
}

#[async_trait]
impl NotificationDispatcher for EmailDispatcher {
    async fn send(&self, config: &ChannelConfig, payload: &NotificationPayload) -> Result<(), DispatchError> {
        let to = config.get("to").and_then(|v| v.as_str()).ok_or_else(|| missing_field("to"))?;

        let subject = if payload.is_summary {
            "ModelGate daily summary".to_string()
        } else {
            format!("ModelGate alert: {:?}", payload.kind)
        };

        let html_body = format!(
            "<html><body><p>{}</p></body></html>",
            html_escape(&payload.message())
        );

        let email = Message::builder()
            .from(self.from.parse().map_err(|e| DispatchError {
                message: format!("invalid from address '{}': {e}", self.from),
                retriable: false,
            })?)
            .to(to.parse().map_err(|e| DispatchError { message: format!("invalid to address '{to}': {e}"), retriable: false })?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body)
            .map_err(|e| DispatchError { message: format!("failed to build email: {e}"), retriable: false })?;

        self.transport
            .send(email)
            .await
            .map_err(|e| DispatchError { message: format!("smtp send failed: {e}"), retriable: true })?;

        Ok(())
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
