//! Long-poll control loop: fetch -> route -> advance the offset.

use std::{sync::Arc, time::Duration};

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::{
    config::Config,
    dispatcher::Dispatcher,
    messaging::{port::UpdateSource, types::IncomingUpdate},
};

#[derive(Clone, Copy, Debug)]
pub struct PollerConfig {
    /// Server-side long-poll timeout passed to every fetch.
    pub timeout: Duration,
    /// Pause after a failed fetch before trying again.
    pub retry_delay: Duration,
}

impl From<&Config> for PollerConfig {
    fn from(cfg: &Config) -> Self {
        Self {
            timeout: cfg.poll_timeout,
            retry_delay: cfg.poll_retry_delay,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PollStats {
    pub batches: u64,
    pub updates: u64,
    pub fetch_failures: u64,
    /// Next offset that would have been requested.
    pub offset: i64,
}

pub struct Poller {
    source: Arc<dyn UpdateSource>,
    dispatcher: Dispatcher,
    cfg: PollerConfig,
    offset: i64,
    stats: PollStats,
}

impl Poller {
    pub fn new(source: Arc<dyn UpdateSource>, dispatcher: Dispatcher, cfg: PollerConfig) -> Self {
        Self {
            source,
            dispatcher,
            cfg,
            offset: 0,
            stats: PollStats::default(),
        }
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Poll until `cancel` fires.
    ///
    /// Cancellation is observed between batches, during the blocking fetch and
    /// during the retry pause, never in the middle of a batch. Open wizard
    /// sessions are discarded on the way out.
    pub async fn run(&mut self, cancel: &CancellationToken) -> PollStats {
        tracing::info!(offset = self.offset, "poller started");

        while !cancel.is_cancelled() {
            let fetched = tokio::select! {
                _ = cancel.cancelled() => break,
                res = self.source.fetch_updates(self.offset, self.cfg.timeout) => res,
            };

            match fetched {
                Ok(batch) => self.route_batch(batch).await,
                Err(e) => {
                    self.stats.fetch_failures += 1;
                    tracing::warn!(offset = self.offset, error = %e, "fetching updates failed");
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = sleep(self.cfg.retry_delay) => {}
                    }
                }
            }
        }

        self.dispatcher.shutdown();
        self.stats.offset = self.offset;
        tracing::info!(
            offset = self.offset,
            batches = self.stats.batches,
            updates = self.stats.updates,
            fetch_failures = self.stats.fetch_failures,
            "poller stopped"
        );
        self.stats
    }

    /// Route a whole batch in order, then commit the offset.
    pub async fn route_batch(&mut self, batch: Vec<IncomingUpdate>) {
        if batch.is_empty() {
            return;
        }

        let mut next = self.offset;
        for update in &batch {
            self.dispatcher.route(update).await;
            next = next.max(update.update_id.0 + 1);
        }

        self.stats.batches += 1;
        self.stats.updates += batch.len() as u64;
        tracing::debug!(size = batch.len(), offset = next, "batch routed");
        self.offset = next;
    }
}
