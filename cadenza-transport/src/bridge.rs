//! Engine push notifications to state store dispatch.

use cadenza_core::{EngineEvent, PlayerEngine, StateStore};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Bridges engine push notifications into [`StateStore`] mutations.
///
/// Subscribed once at session start and live for the process lifetime.
/// Handling is idempotent: a duplicated notification produces a redundant
/// overwrite, never a double side effect. Engine-initiated changes flow
/// through here directly, bypassing the transport controller entirely.
pub struct EventBridge {
    engine: Arc<dyn PlayerEngine>,
    store: Arc<StateStore>,
    cancel_token: CancellationToken,
}

impl EventBridge {
    /// Create a new bridge.
    pub fn new(
        engine: Arc<dyn PlayerEngine>,
        store: Arc<StateStore>,
        cancel_token: Option<CancellationToken>,
    ) -> Self {
        Self {
            engine,
            store,
            cancel_token: cancel_token.unwrap_or_default(),
        }
    }

    /// Get the cancellation token for this bridge.
    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Start consuming notifications in a background task.
    #[must_use]
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    /// Run until the notification channel closes or cancellation fires.
    pub async fn run(&self) {
        info!("Subscribing to engine notifications");
        let mut rx = self.engine.notifications();

        loop {
            tokio::select! {
                () = self.cancel_token.cancelled() => {
                    info!("Event bridge shutting down gracefully");
                    break;
                }
                received = rx.recv() => {
                    match received {
                        Ok(event) => self.handle(event).await,
                        Err(RecvError::Closed) => {
                            info!("Engine notification channel closed");
                            break;
                        }
                        Err(RecvError::Lagged(n)) => {
                            warn!("Missed {} engine notifications", n);
                        }
                    }
                }
            }
        }
    }

    async fn handle(&self, event: EngineEvent) {
        match event {
            EngineEvent::Open => {
                // The notification is purely a signal; the playlist itself
                // has to be pulled.
                match self.engine.playlist().await {
                    Ok(tracks) => {
                        info!("Engine opened a playlist of {} tracks", tracks.len());
                        self.store.replace_playlist(tracks).await;
                    }
                    Err(e) => {
                        warn!("Playlist pull failed, keeping previous playlist: {}", e);
                    }
                }
            }
            EngineEvent::TrackChanged(index) => {
                if let Err(e) = self.store.apply_track_changed(index).await {
                    warn!("Discarding inconsistent track change: {}", e);
                }
            }
            EngineEvent::PlaybackStopped => {
                self.store.apply_engine_stopped().await;
            }
            EngineEvent::VolumeUpdated => {
                match self.engine.volume().await {
                    Ok(level) => self.store.set_volume(level).await,
                    Err(e) => {
                        warn!("Volume pull failed, keeping previous value: {}", e);
                    }
                }
            }
        }
    }
}
