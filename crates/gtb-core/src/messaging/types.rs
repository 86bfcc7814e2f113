use tokio::time::{timeout, Duration};

use crate::{
    domain::{ChatId, MessageRef, UpdateId},
    messaging::port::MessagingPort,
};

/// Cross-messenger incoming update model.
///
/// Telegram-specific fields live in the Telegram adapter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncomingUpdate {
    pub update_id: UpdateId,
    /// `None` for update kinds the bot does not route (edits, callbacks, ...).
    pub message: Option<IncomingMessage>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncomingMessage {
    pub chat_id: ChatId,
    /// `None` for non-text payloads (stickers, photos, ...).
    pub text: Option<String>,
}

impl IncomingUpdate {
    pub fn text(update_id: i64, chat_id: i64, text: &str) -> Self {
        Self {
            update_id: UpdateId(update_id),
            message: Some(IncomingMessage {
                chat_id: ChatId(chat_id),
                text: Some(text.to_string()),
            }),
        }
    }

    pub fn chat_id(&self) -> Option<ChatId> {
        self.message.as_ref().map(|m| m.chat_id)
    }
}

/// Result of a best-effort send. Never propagated into the dispatch loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SendOutcome {
    Delivered(MessageRef),
    Failed(String),
    TimedOut,
}

impl SendOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, SendOutcome::Delivered(_))
    }
}

/// Send `text` without letting a failure escape: errors and timeouts are logged
/// and folded into the returned outcome.
pub async fn send_best_effort(
    messenger: &dyn MessagingPort,
    chat_id: ChatId,
    text: &str,
    limit: Duration,
) -> SendOutcome {
    match timeout(limit, messenger.send_text(chat_id, text)).await {
        Ok(Ok(msg)) => SendOutcome::Delivered(msg),
        Ok(Err(e)) => {
            tracing::warn!(chat_id = chat_id.0, error = %e, "send failed");
            SendOutcome::Failed(e.to_string())
        }
        Err(_) => {
            tracing::warn!(
                chat_id = chat_id.0,
                timeout_ms = limit.as_millis() as u64,
                "send timed out"
            );
            SendOutcome::TimedOut
        }
    }
}
