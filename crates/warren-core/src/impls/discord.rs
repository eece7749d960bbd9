//! DiscordWebhook - Discord の Incoming Webhook に送る Notifier 実装
//!
//! # ペイロード
//! ```json
//! {
//!   "content": "**Process restarting**",
//!   "embeds": [{ "color": 15158332, "fields": [{ "name": "...", "value": "...", "inline": false }] }]
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::ports::Notifier;

/// 埋め込みの色（赤）
pub const EMBED_COLOR: u32 = 15_158_332;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    content: String,
    embeds: Vec<Embed<'a>>,
}

#[derive(Debug, Serialize)]
struct Embed<'a> {
    color: u32,
    fields: Vec<EmbedField<'a>>,
}

#[derive(Debug, Serialize)]
struct EmbedField<'a> {
    name: &'a str,
    value: &'a str,
    inline: bool,
}

impl<'a> WebhookPayload<'a> {
    fn new(title: &str, fields: &'a [(String, String)]) -> Self {
        Self {
            content: format!("**{title}**"),
            embeds: vec![Embed {
                color: EMBED_COLOR,
                fields: fields
                    .iter()
                    .map(|(name, value)| EmbedField {
                        name,
                        value,
                        inline: false,
                    })
                    .collect(),
            }],
        }
    }
}

#[derive(Debug, Clone)]
pub struct DiscordWebhook {
    client: reqwest::Client,
    url: String,
}

impl DiscordWebhook {
    pub fn new(url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Notifier for DiscordWebhook {
    async fn notify(&self, title: &str, fields: &[(String, String)]) -> Option<bool> {
        let payload = WebhookPayload::new(title, fields);

        match self.client.post(&self.url).json(&payload).send().await {
            Ok(response) => {
                let status = response.status();
                debug!(%status, "discord webhook responded");
                Some(status.is_success())
            }
            Err(err) => {
                debug!(error = %err, "discord webhook unreachable");
                None
            }
        }
    }
}
