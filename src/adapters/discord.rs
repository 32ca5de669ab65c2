//! Discord Webhook Notifier
//!
//! Implements the notifier port against a Discord webhook. Delivery is
//! best-effort: failures are logged and swallowed so a dead webhook never
//! stalls an acquisition or a tracker cycle. A `NoopNotifier` stands in
//! when alerts are disabled.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::warn;

use crate::ports::notifier::NotifierPort;

pub struct DiscordNotifier {
    http: Client,
    webhook_url: String,
}

impl DiscordNotifier {
    pub fn new(webhook_url: String, timeout: Duration) -> Self {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self { http, webhook_url }
    }
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    content: &'a str,
}

#[async_trait]
impl NotifierPort for DiscordNotifier {
    async fn notify(&self, message: &str) {
        let payload = WebhookPayload { content: message };
        match self.http.post(&self.webhook_url).json(&payload).send().await {
            Ok(response) if !response.status().is_success() => {
                warn!(
                    "Failed to send notification to Discord: {}",
                    response.status()
                );
            }
            Ok(_) => {}
            Err(e) => warn!("Failed to send notification to Discord: {}", e),
        }
    }
}

/// Notifier used when alerts are disabled.
pub struct NoopNotifier;

#[async_trait]
impl NotifierPort for NoopNotifier {
    async fn notify(&self, _message: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shape() {
        let payload = WebhookPayload { content: "hello" };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json, serde_json::json!({"content": "hello"}));
    }

    #[tokio::test]
    async fn test_unreachable_webhook_does_not_panic() {
        let notifier = DiscordNotifier::new(
            "http://localhost:1/webhook".to_string(),
            Duration::from_millis(50),
        );
        notifier.notify("test").await;
    }
}
