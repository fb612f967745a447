//! Fixed-interval playtime polling.

use cadenza_core::{EngineError, PlayerEngine, StateStore};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Polls the engine for the current playtime on a fixed interval and feeds
/// it to the [`StateStore`].
///
/// The loop runs for the whole session regardless of transport status:
/// polling while paused or stopped is safe and keeps the display honest. A
/// tick that lands while a seek is in flight is skipped entirely rather than
/// queued, so a stale value can never overwrite the just-requested position.
pub struct PlaytimePoller {
    engine: Arc<dyn PlayerEngine>,
    store: Arc<StateStore>,
    poll_interval: Duration,
    cancel_token: CancellationToken,
}

impl PlaytimePoller {
    /// Create a new poller.
    ///
    /// # Arguments
    /// * `engine` - Engine to query for playtime
    /// * `store` - State store to deliver values into
    /// * `poll_interval` - Time between ticks
    /// * `cancel_token` - Optional external cancellation token for graceful shutdown
    pub fn new(
        engine: Arc<dyn PlayerEngine>,
        store: Arc<StateStore>,
        poll_interval: Duration,
        cancel_token: Option<CancellationToken>,
    ) -> Self {
        Self {
            engine,
            store,
            poll_interval,
            cancel_token: cancel_token.unwrap_or_default(),
        }
    }

    /// Get the cancellation token for this poller.
    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Start polling in a background task.
    #[must_use]
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    /// Run the poll loop until cancelled.
    pub async fn run(&self) {
        info!("Starting playtime poller");

        let mut consecutive_errors: u32 = 0;
        let max_backoff = Duration::from_secs(30);

        loop {
            tokio::select! {
                () = self.cancel_token.cancelled() => {
                    info!("Poller shutting down gracefully");
                    break;
                }
                () = tokio::time::sleep(self.poll_interval) => {
                    match self.poll_once().await {
                        Ok(()) => {
                            consecutive_errors = 0;
                        }
                        Err(e) => {
                            consecutive_errors += 1;
                            // The previous displayed value stays in place
                            warn!("Playtime poll error (attempt {}): {}", consecutive_errors, e);

                            let backoff_ms = 100_u64
                                .saturating_mul(2_u64.saturating_pow(consecutive_errors.min(8)));
                            let backoff =
                                Duration::from_millis(backoff_ms).min(max_backoff);

                            if consecutive_errors >= 5 {
                                error!(
                                    "Too many consecutive poll errors, waiting {:?}",
                                    backoff
                                );
                            }

                            tokio::time::sleep(backoff).await;
                        }
                    }
                }
            }
        }
    }

    /// Query the playtime once and deliver it, unless a seek is in flight.
    async fn poll_once(&self) -> Result<(), EngineError> {
        if self.store.seek_in_flight().await {
            debug!("Seek in flight, skipping poll tick");
            return Ok(());
        }

        let playtime = self.engine.playtime().await?;
        self.store.record_playtime(playtime).await;
        Ok(())
    }
}
