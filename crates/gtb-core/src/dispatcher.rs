//! Routes one inbound message at a time.
//!
//! Order of decisions for a message:
//! 1. unverified chat -> greeting + fresh verification code, nothing else
//! 2. text starting with `/` -> command (even mid-wizard)
//! 3. active wizard step -> [`wizard::advance`]
//! 4. otherwise -> "not understood"

use std::{sync::Arc, time::Duration};

use crate::{
    domain::{AccountId, ChatId, UpdateId},
    messaging::{
        port::MessagingPort,
        types::{send_best_effort, IncomingMessage, IncomingUpdate, SendOutcome},
    },
    registry::{ChatUser, UserRegistry},
    replies,
    session::{SessionStore, Step},
    store::GoalStore,
    wizard, Result,
};

pub const COMMAND_PREFIX: char = '/';

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Goals,
    Create,
    Cancel,
    Help,
    Unknown(String),
}

impl Command {
    /// `None` if `text` is not a command at all.
    ///
    /// Telegram may send `/cmd@botname arg1 ...`; only the command word counts.
    pub fn parse(text: &str) -> Option<Self> {
        if !text.starts_with(COMMAND_PREFIX) {
            return None;
        }

        let first = text.split_whitespace().next().unwrap_or("");
        let name = first
            .trim_start_matches(COMMAND_PREFIX)
            .split('@')
            .next()
            .unwrap_or("")
            .to_lowercase();

        Some(match name.as_str() {
            "goals" => Command::Goals,
            "create" => Command::Create,
            "cancel" => Command::Cancel,
            "start" | "help" => Command::Help,
            _ => Command::Unknown(name),
        })
    }
}

pub struct Dispatcher {
    registry: UserRegistry,
    sessions: SessionStore,
    goals: Arc<dyn GoalStore>,
    messenger: Arc<dyn MessagingPort>,
    send_timeout: Duration,
    last_routed: Option<UpdateId>,
}

impl Dispatcher {
    pub fn new(
        registry: UserRegistry,
        goals: Arc<dyn GoalStore>,
        messenger: Arc<dyn MessagingPort>,
        send_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            sessions: SessionStore::new(),
            goals,
            messenger,
            send_timeout,
            last_routed: None,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn last_routed(&self) -> Option<UpdateId> {
        self.last_routed
    }

    /// Drop every in-flight wizard.
    pub fn shutdown(&mut self) {
        if !self.sessions.is_empty() {
            tracing::info!(sessions = self.sessions.len(), "discarding open sessions");
        }
        self.sessions.clear();
    }

    /// Route one update. Never fails: errors are logged and answered with a
    /// generic reply so the poll loop keeps going.
    ///
    /// Updates at or below the highest id already routed are skipped, which
    /// makes redelivery of a batch after an interrupted poll harmless.
    pub async fn route(&mut self, update: &IncomingUpdate) {
        if self.last_routed.is_some_and(|last| update.update_id <= last) {
            tracing::debug!(update_id = update.update_id.0, "skipping redelivered update");
            return;
        }

        if let Some(msg) = &update.message {
            if let Err(e) = self.handle_message(msg).await {
                tracing::error!(
                    update_id = update.update_id.0,
                    chat_id = msg.chat_id.0,
                    error = %e,
                    "update handling failed"
                );
                self.reply(msg.chat_id, replies::UNEXPECTED).await;
            }
        } else {
            tracing::debug!(update_id = update.update_id.0, "ignoring non-message update");
        }

        self.last_routed = Some(update.update_id);
    }

    async fn handle_message(&mut self, msg: &IncomingMessage) -> Result<()> {
        let mut user = self.registry.resolve(msg.chat_id).await?;
        let Some(account) = user.account else {
            return self.verification_gate(&mut user).await;
        };

        let text = msg.text.as_deref();
        if let Some(cmd) = text.and_then(Command::parse) {
            return self.handle_command(msg.chat_id, account, cmd).await;
        }

        match (self.sessions.get(msg.chat_id), text) {
            (Some(step), Some(text)) => {
                self.advance_session(msg.chat_id, account, step, text)
                    .await
            }
            _ => {
                self.reply(msg.chat_id, replies::NOT_UNDERSTOOD).await;
                Ok(())
            }
        }
    }

    async fn verification_gate(&mut self, user: &mut ChatUser) -> Result<()> {
        let code = self.registry.issue_code(user).await?;
        tracing::info!(chat_id = user.chat_id.0, "issued verification code");

        self.reply(user.chat_id, replies::GREETING).await;
        self.reply(user.chat_id, &replies::verification_code(&code))
            .await;
        Ok(())
    }

    async fn handle_command(
        &mut self,
        chat_id: ChatId,
        account: AccountId,
        cmd: Command,
    ) -> Result<()> {
        tracing::debug!(chat_id = chat_id.0, command = ?cmd, "command");
        match cmd {
            Command::Goals => {
                let goals = self.goals.list_goals(account).await?;
                self.reply(chat_id, &replies::goal_list(&goals)).await;
            }
            Command::Create => {
                let categories = self.goals.list_categories(account).await?;
                if categories.is_empty() {
                    self.reply(chat_id, replies::NO_CATEGORIES).await;
                    return Ok(());
                }
                self.sessions.set(chat_id, Step::AwaitingCategory);
                self.reply(chat_id, &replies::category_list(&categories))
                    .await;
            }
            Command::Cancel => {
                self.sessions.remove(chat_id);
                self.reply(chat_id, replies::CANCELLED).await;
            }
            Command::Help => {
                self.reply(chat_id, replies::HELP).await;
            }
            // An open wizard is left as is; the next plain text still reaches it.
            Command::Unknown(_) => {
                self.reply(chat_id, replies::COMMAND_NOT_FOUND).await;
            }
        }
        Ok(())
    }

    async fn advance_session(
        &mut self,
        chat_id: ChatId,
        account: AccountId,
        step: Step,
        text: &str,
    ) -> Result<()> {
        let transition = wizard::advance(self.goals.as_ref(), account, step, text).await?;
        match transition.next {
            Some(next) => self.sessions.set(chat_id, next),
            None => {
                self.sessions.remove(chat_id);
            }
        }
        self.reply(chat_id, &transition.reply).await;
        Ok(())
    }

    async fn reply(&self, chat_id: ChatId, text: &str) -> SendOutcome {
        send_best_effort(self.messenger.as_ref(), chat_id, text, self.send_timeout).await
    }
}
