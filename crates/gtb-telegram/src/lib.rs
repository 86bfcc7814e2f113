//! Telegram adapter (teloxide).
//!
//! Implements the `gtb-core` messaging ports over the Telegram Bot API. Only
//! raw `getUpdates`/`sendMessage` requests are used: the core poller owns the
//! update offset, so teloxide's own dispatcher is not involved.

use std::time::Duration;

use async_trait::async_trait;

use teloxide::{
    prelude::*,
    types::{AllowedUpdate, Update, UpdateKind},
};

pub mod router;

use gtb_core::{
    config::Config,
    domain::{ChatId, MessageId, MessageRef, UpdateId},
    errors::Error,
    messaging::{
        port::{MessagingPort, UpdateSource},
        types::{IncomingMessage, IncomingUpdate},
    },
    Result,
};

/// Headroom on top of the long-poll timeout for the HTTP client.
const HTTP_TIMEOUT_MARGIN: Duration = Duration::from_secs(10);

/// Build a bot whose HTTP client outlives the long-poll timeout.
///
/// teloxide's default client gives up after 17s, which would abort every
/// long poll longer than that.
pub fn build_bot(cfg: &Config) -> Result<Bot> {
    let client = teloxide::net::default_reqwest_settings()
        .timeout(cfg.poll_timeout.saturating_add(HTTP_TIMEOUT_MARGIN))
        .build()
        .map_err(|e| Error::Config(format!("http client: {e}")))?;

    let mut bot = Bot::with_client(cfg.telegram_bot_token.clone(), client);
    if let Some(url) = &cfg.telegram_api_url {
        let url = reqwest::Url::parse(url)
            .map_err(|e| Error::Config(format!("TELEGRAM_API_URL: {e}")))?;
        bot = bot.set_api_url(url);
    }
    Ok(bot)
}

fn map_err(e: teloxide::RequestError) -> Error {
    Error::Transport(format!("telegram error: {e}"))
}

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef> {
        let msg = self
            .bot
            .send_message(Self::tg_chat(chat_id), text.to_string())
            .await
            .map_err(map_err)?;

        Ok(MessageRef {
            chat_id,
            message_id: MessageId(msg.id.0),
        })
    }
}

/// `getUpdates` long polling.
#[derive(Clone)]
pub struct TelegramUpdates {
    bot: Bot,
}

impl TelegramUpdates {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl UpdateSource for TelegramUpdates {
    async fn fetch_updates(&self, offset: i64, timeout: Duration) -> Result<Vec<IncomingUpdate>> {
        let offset = i32::try_from(offset)
            .map_err(|_| Error::Transport(format!("offset {offset} out of range")))?;
        let timeout = u32::try_from(timeout.as_secs()).unwrap_or(u32::MAX);

        let updates = self
            .bot
            .get_updates()
            .offset(offset)
            .timeout(timeout)
            .allowed_updates(vec![AllowedUpdate::Message])
            .await
            .map_err(map_err)?;

        Ok(updates.iter().map(to_incoming).collect())
    }
}

/// Map a Telegram update onto the core model; non-message kinds keep their id
/// (so the offset still moves) but carry no message.
pub fn to_incoming(update: &Update) -> IncomingUpdate {
    let message = match &update.kind {
        UpdateKind::Message(msg) => Some(IncomingMessage {
            chat_id: ChatId(msg.chat.id.0),
            text: msg.text().map(str::to_string),
        }),
        _ => None,
    };

    IncomingUpdate {
        update_id: UpdateId(i64::from(update.id)),
        message,
    }
}
