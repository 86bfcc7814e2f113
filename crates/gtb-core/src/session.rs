use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{CategoryId, ChatId};

/// Where a chat currently is in the create-goal wizard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    AwaitingCategory,
    AwaitingTitle { category: CategoryId },
}

/// At most one wizard step per chat. A missing entry means the chat is idle.
///
/// Owned by the dispatcher and mutated only from its single routing path.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<ChatId, Step>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, chat_id: ChatId) -> Option<Step> {
        self.sessions.get(&chat_id).copied()
    }

    /// Set (or replace) the chat's step.
    pub fn set(&mut self, chat_id: ChatId, step: Step) {
        self.sessions.insert(chat_id, step);
    }

    pub fn remove(&mut self, chat_id: ChatId) -> Option<Step> {
        self.sessions.remove(&chat_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn clear(&mut self) {
        self.sessions.clear();
    }
}
