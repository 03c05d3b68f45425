//! Telegram Bot API over long polling.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

use super::Transport;
use crate::commands::InboundMessage;
use crate::store::ChatId;

const API_BASE: &str = "https://api.telegram.org";

/// How long Telegram holds a `getUpdates` call open when there is nothing new.
const POLL_TIMEOUT_SECS: u64 = 30;

pub struct TelegramTransport {
    client: reqwest::Client,
    base: String,
    offset: i64,
    pending: VecDeque<InboundMessage>,
}

impl TelegramTransport {
    pub fn new(token: &str) -> Result<Self> {
        Self::with_base(API_BASE, token)
    }

    /// Point at a different Bot API server (self-hosted, or a test double).
    pub fn with_base(api_base: &str, token: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(POLL_TIMEOUT_SECS + 10))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            base: format!("{}/bot{}", api_base.trim_end_matches('/'), token),
            offset: 0,
            pending: VecDeque::new(),
        })
    }

    async fn call<B: Serialize + Sync, R: DeserializeOwned>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<R> {
        let resp = self
            .client
            .post(format!("{}/{}", self.base, method))
            .json(body)
            .send()
            .await
            .with_context(|| format!("telegram {method} request failed"))?;

        let api: ApiResponse<R> = resp.json().await?;
        if !api.ok {
            bail!(
                "telegram {method} failed: {}",
                api.description.unwrap_or_default()
            );
        }
        api.result
            .with_context(|| format!("telegram {method} returned no result"))
    }

    /// The bot's own username, used to recognise `/cmd@username` addressing.
    pub async fn username(&self) -> Result<String> {
        let me: User = self.call("getMe", &serde_json::json!({})).await?;
        me.username
            .context("telegram getMe returned a bot without a username")
    }

    /// Queue the text messages in a batch of updates and advance the offset
    /// past all of them, text or not.
    fn absorb(&mut self, updates: Vec<Update>) {
        for update in updates {
            self.offset = self.offset.max(update.update_id + 1);
            if let Some(message) = update.message
                && let Some(text) = message.text
            {
                self.pending
                    .push_back(InboundMessage::new(message.chat.id, text));
            }
        }
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn next_message(&mut self) -> Result<Option<InboundMessage>> {
        loop {
            if let Some(message) = self.pending.pop_front() {
                return Ok(Some(message));
            }
            let request = GetUpdates {
                offset: self.offset,
                timeout: POLL_TIMEOUT_SECS,
                allowed_updates: &["message"],
            };
            let updates: Vec<Update> = self.call("getUpdates", &request).await?;
            self.absorb(updates);
        }
    }

    async fn send(&self, chat_id: ChatId, text: &str) -> Result<()> {
        let _: serde_json::Value = self
            .call("sendMessage", &SendMessage { chat_id, text })
            .await?;
        Ok(())
    }
}

// --- API types ---

#[derive(Serialize)]
struct GetUpdates<'a> {
    offset: i64,
    timeout: u64,
    allowed_updates: &'a [&'a str],
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: ChatId,
    text: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse<R> {
    ok: bool,
    result: Option<R>,
    description: Option<String>,
}

#[derive(Deserialize)]
struct User {
    username: Option<String>,
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
    id: ChatId,
}
