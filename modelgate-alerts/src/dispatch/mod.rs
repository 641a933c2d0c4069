//! Per-channel-kind notification dispatch, per SPEC_FULL.md §4.J.

mod email;
mod slack;
mod webhook;

pub use email::{EmailDispatcher, SmtpSettings};
pub use slack::SlackDispatcher;
pub use webhook::WebhookDispatcher;

use crate::payload::NotificationPayload;
use async_trait::async_trait;
use modelgate_core::ChannelConfig;

#[derive(Debug, Clone)]
pub struct DispatchError {
    pub message: String,
    /// Whether the caller's retry loop should try again later (network hiccup, 5xx) versus give
    /// up (malformed channel config, 4xx).
    pub retriable: bool,
}

impl std::fmt::Display for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for DispatchError {}

#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn send(&self, config: &ChannelConfig, payload: &NotificationPayload) -> Result<(), DispatchError>;
}

pub(crate) fn missing_field(field: &str) -> DispatchError {
    DispatchError { message: format!("channel config missing required field '{field}'"), retriable: false }
}
