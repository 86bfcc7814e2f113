use std::sync::Arc;

use teloxide::prelude::*;
use tokio_util::sync::CancellationToken;

use gtb_core::{
    config::Config,
    dispatcher::Dispatcher,
    messaging::port::{MessagingPort, UpdateSource},
    poller::{PollStats, Poller, PollerConfig},
    registry::{ChatUserStore, UserRegistry},
    store::GoalStore,
};

use crate::{build_bot, TelegramMessenger, TelegramUpdates};

/// The todo-list service's stores the dispatcher reads and writes through.
#[derive(Clone)]
pub struct Collaborators {
    pub users: Arc<dyn ChatUserStore>,
    pub goals: Arc<dyn GoalStore>,
}

/// Wire the Telegram adapter to the core and long-poll until `cancel` fires.
pub async fn run_polling(
    cfg: Arc<Config>,
    collaborators: Collaborators,
    cancel: CancellationToken,
) -> anyhow::Result<PollStats> {
    let bot = build_bot(&cfg)?;

    // Basic startup info; a bad token shows up here first.
    match bot.get_me().await {
        Ok(me) => tracing::info!(username = %me.username(), "gtb started"),
        Err(e) => tracing::warn!(error = %e, "getMe failed; polling anyway"),
    }
    tracing::info!(
        poll_timeout_secs = cfg.poll_timeout.as_secs(),
        send_timeout_ms = cfg.send_timeout.as_millis() as u64,
        "polling configuration"
    );

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let source: Arc<dyn UpdateSource> = Arc::new(TelegramUpdates::new(bot));

    let dispatcher = Dispatcher::new(
        UserRegistry::new(collaborators.users),
        collaborators.goals,
        messenger,
        cfg.send_timeout,
    );

    let mut poller = Poller::new(source, dispatcher, PollerConfig::from(cfg.as_ref()));
    Ok(poller.run(&cancel).await)
}
