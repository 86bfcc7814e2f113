use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use gtb_core::{
    config::Config,
    store::memory::{InMemoryChatUsers, InMemoryGoalStore},
};
use gtb_telegram::router::Collaborators;

#[tokio::main]
async fn main() -> Result<(), gtb_core::Error> {
    gtb_core::logging::init("gtb")?;

    let cfg = Arc::new(Config::load()?);

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("shutdown requested");
                    cancel.cancel();
                }
                Err(e) => tracing::warn!(error = %e, "cannot listen for Ctrl-C"),
            }
        });
    }

    let collaborators = Collaborators {
        users: Arc::new(InMemoryChatUsers::new()),
        goals: Arc::new(InMemoryGoalStore::new()),
    };

    let stats = gtb_telegram::router::run_polling(cfg, collaborators, cancel)
        .await
        .map_err(|e| gtb_core::Error::External(format!("telegram bot failed: {e}")))?;

    tracing::info!(
        offset = stats.offset,
        batches = stats.batches,
        updates = stats.updates,
        fetch_failures = stats.fetch_failures,
        "bye"
    );
    Ok(())
}
