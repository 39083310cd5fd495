//! Telegram Bot API channel.
//!
//! Sends the report body as plain text (no parse mode, so scraped snippets
//! containing `<` or `&` cannot break the request).

use super::{Notification, Notifier};
use crate::config::TelegramConfig;
use crate::error::WatchError;
use crate::utils::truncate_chars;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// Longest message text Telegram accepts.
pub const MAX_MESSAGE_CHARS: usize = 4096;

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    disable_web_page_preview: bool,
}

#[derive(Debug, Deserialize)]
struct BotReply {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug)]
pub struct TelegramNotifier {
    client: Client,
    config: TelegramConfig,
}

impl TelegramNotifier {
    pub fn new(config: TelegramConfig) -> Result<Self, WatchError> {
        let client = Client::builder().timeout(Duration::from_secs(15)).build()?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: Client, config: TelegramConfig) -> Self {
        Self { client, config }
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.config.api_base, self.config.token)
    }
}

impl Notifier for TelegramNotifier {
    fn channel(&self) -> &'static str {
        "telegram"
    }

    #[instrument(level = "info", skip_all, fields(chat_id = %self.config.chat_id))]
    async fn send(&self, notification: &Notification) -> Result<(), WatchError> {
        let payload = SendMessage {
            chat_id: &self.config.chat_id,
            text: truncate_chars(&notification.body, MAX_MESSAGE_CHARS),
            disable_web_page_preview: true,
        };

        // The endpoint embeds the bot token; keep it out of error messages.
        let response = self
            .client
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            .map_err(|e| WatchError::Http(e.without_url()))?;
        let status = response.status();
        let reply: Option<BotReply> = response.json().await.ok();
        debug!(%status, ?reply, "Telegram replied");

        match reply {
            Some(BotReply { ok: true, .. }) if status.is_success() => Ok(()),
            Some(BotReply {
                description: Some(description),
                ..
            }) => Err(WatchError::Telegram(format!("{status}: {description}"))),
            _ => Err(WatchError::Telegram(format!("unexpected reply, HTTP {status}"))),
        }
    }
}
