// src/telegram/client.rs
// Telegram Bot API client (sendMessage + getUpdates long polling)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CommandSource, InboundCommand, Notifier};
use crate::config::WatchConfig;
use crate::error::{Result, WatchError};

#[derive(Clone)]
pub struct TelegramClient {
    http: Client,
    bot_url: String,
    chat_id: String,
    send_timeout: Duration,
    long_poll: Duration,
    long_poll_client_timeout: Duration,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct UpdatesResponse {
    ok: bool,
    #[serde(default)]
    result: Vec<Update>,
    description: Option<String>,
}

#[derive(Deserialize)]
struct Update {
    update_id: i64,
    message: Option<Message>,
}

#[derive(Deserialize)]
struct Message {
    chat: Chat,
    text: Option<String>,
}

#[derive(Deserialize)]
struct Chat {
    id: i64,
}

impl TelegramClient {
    pub fn new(http: Client, config: &WatchConfig) -> Self {
        Self {
            http,
            bot_url: config.telegram_bot_url(),
            chat_id: config.chat_id.clone(),
            send_timeout: config.request_timeout,
            long_poll: config.long_poll_timeout,
            long_poll_client_timeout: config.long_poll_client_timeout(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.bot_url, method)
    }
}

#[async_trait]
impl Notifier for TelegramClient {
    async fn send_message(&self, text: &str) -> Result<()> {
        let response = self
            .http
            .post(self.method_url("sendMessage"))
            .timeout(self.send_timeout)
            .json(&SendMessage {
                chat_id: &self.chat_id,
                text,
            })
            .send()
            .await
            .map_err(redact)?;

        if !response.status().is_success() {
            return Err(WatchError::Transport(format!(
                "sendMessage returned HTTP {}",
                response.status().as_u16()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl CommandSource for TelegramClient {
    async fn poll(&self, since_offset: Option<i64>) -> Result<Vec<InboundCommand>> {
        let mut query = vec![("timeout", self.long_poll.as_secs().to_string())];
        if let Some(offset) = since_offset {
            query.push(("offset", offset.to_string()));
        }

        let response = self
            .http
            .get(self.method_url("getUpdates"))
            .query(&query)
            .timeout(self.long_poll_client_timeout)
            .send()
            .await
            .map_err(redact)?;

        if !response.status().is_success() {
            return Err(WatchError::Transport(format!(
                "getUpdates returned HTTP {}",
                response.status().as_u16()
            )));
        }

        let body: UpdatesResponse = response.json().await.map_err(redact)?;
        let commands = parse_updates(body)?;
        if !commands.is_empty() {
            debug!("Received {} updates", commands.len());
        }
        Ok(commands)
    }
}

/// Request URLs embed the bot token; keep them out of errors and the event log
fn redact(err: reqwest::Error) -> WatchError {
    WatchError::Http(err.without_url())
}

/// Updates without a text message still come through (empty text, unknown chat)
/// so their ids move the offset past them.
fn parse_updates(body: UpdatesResponse) -> Result<Vec<InboundCommand>> {
    if !body.ok {
        return Err(WatchError::Transport(format!(
            "getUpdates failed: {}",
            body.description.unwrap_or_else(|| "unknown error".to_string())
        )));
    }

    let mut commands: Vec<InboundCommand> = body
        .result
        .into_iter()
        .map(|update| match update.message {
            Some(message) => InboundCommand {
                id: update.update_id,
                chat_id: message.chat.id.to_string(),
                text: message.text.unwrap_or_default(),
            },
            None => InboundCommand {
                id: update.update_id,
                chat_id: String::new(),
                text: String::new(),
            },
        })
        .collect();
    commands.sort_by_key(|c| c.id);
    Ok(commands)
}
