use std::time::Duration;

use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageRef},
    messaging::types::IncomingUpdate,
    Result,
};

/// Outbound side of the messaging service.
///
/// Telegram is the only implementation today; fakes implement it in tests.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef>;
}

/// Inbound side of the messaging service: long-poll fetch of updates.
///
/// Implementations return the batch ordered by `update_id` ascending and only
/// include updates with `update_id >= offset`.
#[async_trait]
pub trait UpdateSource: Send + Sync {
    async fn fetch_updates(&self, offset: i64, timeout: Duration) -> Result<Vec<IncomingUpdate>>;
}
