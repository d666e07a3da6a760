//! Slack webhook notifications.
//!
//! Fire-and-forget: a failed send is logged and swallowed. Notifications
//! must never take a request or the process down with them.

use chrono::Utc;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::SlackConfig;

const PLACEHOLDER_WEBHOOK: &str = "https://hooks.slack.com/services/YOUR/WEBHOOK/URL";

/// Posts formatted messages to a Slack incoming webhook.
pub struct SlackNotifier {
    config: SlackConfig,
    client: reqwest::Client,
}

impl SlackNotifier {
    pub fn new(config: SlackConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self { config, client }
    }

    fn webhook_url(&self) -> Option<&str> {
        if !self.config.enabled {
            return None;
        }
        self.config
            .webhook_url
            .as_deref()
            .filter(|url| !url.is_empty() && *url != PLACEHOLDER_WEBHOOK)
    }

    /// Send one message. Unconfigured webhook short-circuits with a warn.
    pub async fn send(&self, channel: &str, text: &str, color: Option<&str>, title: Option<&str>) {
        let Some(url) = self.webhook_url() else {
            warn!("slack webhook not configured, skipping notification");
            return;
        };

        let payload = build_payload(&self.config.username, channel, text, color, title);

        match self.client.post(url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {
                debug!("slack notification sent to {channel}");
            }
            Ok(response) => {
                warn!("slack notification rejected: status {}", response.status());
            }
            Err(e) => {
                warn!("slack notification failed: {e}");
            }
        }
    }

    /// Server start announcement.
    pub async fn notify_startup(&self, environment: &str) {
        let text = format!(
            "🚀 *koyn started*\n\n*Environment:* {environment}\n*Start time:* {}",
            now_stamp()
        );
        self.send(&self.config.alert_channel, &text, Some("good"), Some("Startup"))
            .await;
    }

    /// Server shutdown announcement.
    pub async fn notify_shutdown(&self, environment: &str) {
        let text = format!(
            "🛑 *koyn shutting down*\n\n*Environment:* {environment}\n*Shutdown time:* {}",
            now_stamp()
        );
        self.send(&self.config.alert_channel, &text, Some("warning"), Some("Shutdown"))
            .await;
    }

    /// Error alert with an optional detail block.
    pub async fn notify_error(&self, title: &str, detail: Option<&str>) {
        let mut text = format!("🚨 *{title}*");
        if let Some(detail) = detail {
            text.push_str(&format!("\n\n```{detail}```"));
        }
        text.push_str(&format!("\n\n*Time:* {}", now_stamp()));

        self.send(&self.config.error_channel, &text, Some("danger"), Some("Application Error"))
            .await;
    }
}

fn now_stamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Assemble the webhook payload. Title or color switch the message to the
/// attachment form.
fn build_payload(
    username: &str,
    channel: &str,
    text: &str,
    color: Option<&str>,
    title: Option<&str>,
) -> Value {
    let mut payload = json!({
        "channel": channel,
        "username": username,
        "icon_emoji": ":robot_face:",
    });

    if color.is_some() || title.is_some() {
        let mut attachment = json!({ "text": text });
        if let Some(color) = color {
            attachment["color"] = json!(color);
        }
        if let Some(title) = title {
            attachment["title"] = json!(title);
        }
        payload["attachments"] = json!([attachment]);
    } else {
        payload["text"] = json!(text);
    }

    payload
}
