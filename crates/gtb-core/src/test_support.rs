//! Fakes for the ports, shared by the unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::{
    domain::{AccountId, CategoryId, ChatId, MessageId, MessageRef},
    errors::Error,
    messaging::{port::MessagingPort, port::UpdateSource, types::IncomingUpdate},
    store::{Category, Goal, GoalStore},
    Result,
};

#[derive(Default)]
pub struct FakeMessenger {
    next_id: Mutex<i32>,
    sends: Mutex<Vec<(ChatId, String)>>,
    fail: bool,
    delay: Option<Duration>,
}

impl FakeMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<(ChatId, String)> {
        self.sends.lock().unwrap().clone()
    }

    pub fn texts_for(&self, chat_id: ChatId) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|(c, _)| *c == chat_id)
            .map(|(_, t)| t)
            .collect()
    }

    pub fn last_text(&self) -> Option<String> {
        self.sent().pop().map(|(_, t)| t)
    }

    pub fn clear(&self) {
        self.sends.lock().unwrap().clear();
    }
}

#[async_trait]
impl MessagingPort for FakeMessenger {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef> {
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        self.sends.lock().unwrap().push((chat_id, text.to_string()));
        if self.fail {
            return Err(Error::Transport("chat not reachable".to_string()));
        }
        let mut guard = self.next_id.lock().unwrap();
        *guard += 1;
        Ok(MessageRef {
            chat_id,
            message_id: MessageId(*guard),
        })
    }
}

/// Goal store whose every call fails like a dropped database connection.
pub struct BrokenGoalStore;

#[async_trait]
impl GoalStore for BrokenGoalStore {
    async fn list_categories(&self, _account: AccountId) -> Result<Vec<Category>> {
        Err(Error::External("database unavailable".to_string()))
    }

    async fn get_category(&self, _id: CategoryId) -> Result<Category> {
        Err(Error::External("database unavailable".to_string()))
    }

    async fn create_goal(
        &self,
        _account: AccountId,
        _category: CategoryId,
        _title: &str,
    ) -> Result<Goal> {
        Err(Error::External("database unavailable".to_string()))
    }

    async fn list_goals(&self, _account: AccountId) -> Result<Vec<Goal>> {
        Err(Error::External("database unavailable".to_string()))
    }
}

/// Scripted update source: hands out the queued responses in order, then
/// cancels `done` and returns empty batches.
pub struct FakeUpdateSource {
    script: Mutex<VecDeque<Result<Vec<IncomingUpdate>>>>,
    offsets: Mutex<Vec<i64>>,
    done: CancellationToken,
}

impl FakeUpdateSource {
    pub fn new(done: CancellationToken) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            offsets: Mutex::new(Vec::new()),
            done,
        }
    }

    pub fn push_batch(&self, batch: Vec<IncomingUpdate>) {
        self.script.lock().unwrap().push_back(Ok(batch));
    }

    pub fn push_failure(&self) {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(Error::Transport("502 Bad Gateway".to_string())));
    }

    /// Offsets passed to every fetch so far.
    pub fn offsets(&self) -> Vec<i64> {
        self.offsets.lock().unwrap().clone()
    }
}

#[async_trait]
impl UpdateSource for FakeUpdateSource {
    async fn fetch_updates(&self, offset: i64, _timeout: Duration) -> Result<Vec<IncomingUpdate>> {
        self.offsets.lock().unwrap().push(offset);
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(res) => res,
            None => {
                self.done.cancel();
                Ok(Vec::new())
            }
        }
    }
}
