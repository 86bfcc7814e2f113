//! Chat id -> account mapping and verification codes.
//!
//! A chat is *verified* once the todo-list service has linked it to an
//! account by consuming a code the bot handed out. Until then every message
//! from the chat gets a fresh code.

use std::sync::Arc;

use async_trait::async_trait;
use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};
use serde::{Deserialize, Serialize};

use crate::{
    domain::{AccountId, ChatId},
    Result,
};

pub const VERIFICATION_CODE_LEN: usize = 20;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatUser {
    pub chat_id: ChatId,
    pub account: Option<AccountId>,
    pub verification_code: Option<String>,
}

impl ChatUser {
    pub fn new(chat_id: ChatId) -> Self {
        Self {
            chat_id,
            account: None,
            verification_code: None,
        }
    }

    pub fn is_verified(&self) -> bool {
        self.account.is_some()
    }
}

/// Storage for chat users, owned by the todo-list service.
///
/// `link` is the service's side of the exchange: it is never called by the
/// dispatcher, which only observes the linked account on a later message.
#[async_trait]
pub trait ChatUserStore: Send + Sync {
    async fn get_or_create(&self, chat_id: ChatId) -> Result<ChatUser>;
    async fn save_code(&self, chat_id: ChatId, code: &str) -> Result<()>;

    /// Consume `code` and link its chat to `account`.
    ///
    /// Unknown code -> `NotFound`; chat already linked -> `Validation`.
    async fn link(&self, code: &str, account: AccountId) -> Result<ChatUser>;
}

pub struct UserRegistry {
    store: Arc<dyn ChatUserStore>,
}

impl UserRegistry {
    pub fn new(store: Arc<dyn ChatUserStore>) -> Self {
        Self { store }
    }

    /// Get-or-create; existing users are returned untouched.
    pub async fn resolve(&self, chat_id: ChatId) -> Result<ChatUser> {
        self.store.get_or_create(chat_id).await
    }

    pub fn is_verified(user: &ChatUser) -> bool {
        user.is_verified()
    }

    /// Replace the user's code with a fresh one and persist it.
    pub async fn issue_code(&self, user: &mut ChatUser) -> Result<String> {
        let code = generate_code();
        self.store.save_code(user.chat_id, &code).await?;
        user.verification_code = Some(code.clone());
        Ok(code)
    }
}

/// Random `[A-Za-z0-9]` code drawn from the OS CSPRNG.
pub fn generate_code() -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(VERIFICATION_CODE_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryChatUsers;

    #[test]
    fn codes_are_alphanumeric_and_fixed_length() {
        for _ in 0..50 {
            let code = generate_code();
            assert_eq!(code.len(), VERIFICATION_CODE_LEN);
            assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
        }
        assert_ne!(generate_code(), generate_code());
    }

    #[tokio::test]
    async fn resolve_creates_unverified_users_once() {
        let users = Arc::new(InMemoryChatUsers::new());
        let registry = UserRegistry::new(users.clone());

        let user = registry.resolve(ChatId(3)).await.unwrap();
        assert_eq!(user, ChatUser::new(ChatId(3)));
        assert!(!UserRegistry::is_verified(&user));

        registry.resolve(ChatId(3)).await.unwrap();
        assert_eq!(users.len().await, 1);
    }

    #[tokio::test]
    async fn every_issue_replaces_the_previous_code() {
        let users = Arc::new(InMemoryChatUsers::new());
        let registry = UserRegistry::new(users.clone());
        let mut user = registry.resolve(ChatId(3)).await.unwrap();

        let first = registry.issue_code(&mut user).await.unwrap();
        let second = registry.issue_code(&mut user).await.unwrap();
        assert_ne!(first, second);
        assert_eq!(user.verification_code.as_deref(), Some(second.as_str()));

        let stored = users.get(ChatId(3)).await.unwrap();
        assert_eq!(stored.verification_code, Some(second.clone()));

        // Only the latest code can be exchanged.
        assert!(users.link(&first, AccountId(1)).await.is_err());
        assert!(users.link(&second, AccountId(1)).await.is_ok());
        let user = registry.resolve(ChatId(3)).await.unwrap();
        assert!(UserRegistry::is_verified(&user));
    }
}
