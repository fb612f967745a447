//! Transport commands and the seek protocol.

use crate::error::{Result, TransportError};
use cadenza_core::{
    clamp_volume, CoreError, PlaybackStatus, PlayerEngine, StateStore, SyncConfig,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Built-in cover art shown when the current track has no embedded image or
/// the pull fails.
pub const DEFAULT_ALBUM_COVER: &[u8] = include_bytes!("../assets/default-cover.svg");

/// Issues commands to the engine and applies acknowledged state locally.
///
/// Commands are best-effort with no built-in retry. Status acknowledgments
/// go through the store's reconciliation, so a push event that raced ahead
/// of an acknowledgment always wins. Track advances (`next`, `previous`,
/// `change_track`) never touch the current index here; the engine confirms
/// them with a `track_changed` notification, because an advance can fail or
/// happen engine-side.
pub struct TransportController {
    engine: Arc<dyn PlayerEngine>,
    store: Arc<StateStore>,
    seek_timeout: Duration,
}

impl TransportController {
    /// Create a new controller.
    pub fn new(engine: Arc<dyn PlayerEngine>, store: Arc<StateStore>, config: &SyncConfig) -> Self {
        Self {
            engine,
            store,
            seek_timeout: config.seek_timeout(),
        }
    }

    /// Start or resume playback.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::NoTrackSelected`] without a current track,
    /// or an error if the engine rejects the command or is unreachable.
    pub async fn play(&self) -> Result<()> {
        self.require_current_track().await?;
        let issued_at = Instant::now();
        self.engine.play().await?;
        self.store
            .apply_ack_status(PlaybackStatus::Playing, issued_at)
            .await;
        Ok(())
    }

    /// Pause playback.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::NoTrackSelected`] without a current track,
    /// or an error if the engine rejects the command or is unreachable.
    pub async fn pause(&self) -> Result<()> {
        self.require_current_track().await?;
        let issued_at = Instant::now();
        self.engine.pause().await?;
        self.store
            .apply_ack_status(PlaybackStatus::Paused, issued_at)
            .await;
        Ok(())
    }

    /// Leaving Stopped needs a loaded track; `stop` itself is always valid.
    async fn require_current_track(&self) -> Result<()> {
        if self.store.current_track().await.is_none() {
            return Err(TransportError::NoTrackSelected);
        }
        Ok(())
    }

    /// Stop playback and rewind the displayed position.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine rejects the command or is unreachable.
    pub async fn stop(&self) -> Result<()> {
        let issued_at = Instant::now();
        self.engine.stop().await?;
        self.store
            .apply_ack_status(PlaybackStatus::Stopped, issued_at)
            .await;
        Ok(())
    }

    /// Request the next track. The current index is only updated when the
    /// engine confirms with a `track_changed` notification.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine rejects the command or is unreachable.
    pub async fn next(&self) -> Result<()> {
        debug!("Requesting track advance");
        self.engine.next().await?;
        Ok(())
    }

    /// Request the previous track. The current index is only updated when
    /// the engine confirms with a `track_changed` notification.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine rejects the command or is unreachable.
    pub async fn previous(&self) -> Result<()> {
        debug!("Requesting track retreat");
        self.engine.previous().await?;
        Ok(())
    }

    /// Request a switch to the track at `index`, e.g. from a playlist row
    /// double-select. Confirmation arrives via `track_changed`.
    ///
    /// # Errors
    ///
    /// Returns an error for an index outside the current playlist, or if the
    /// engine rejects the command or is unreachable.
    pub async fn change_track(&self, index: usize) -> Result<()> {
        let len = self.store.snapshot().await.playlist.len();
        if index >= len {
            return Err(CoreError::TrackIndexOutOfRange { index, len }.into());
        }

        info!("Requesting switch to track {}", index);
        self.engine.change_track(index).await?;
        Ok(())
    }

    /// Set the volume. The local value updates optimistically before the
    /// command is sent, so the control never lags the pointer; every change
    /// is sent immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine rejects the command or is unreachable.
    pub async fn set_volume(&self, level: f32) -> Result<()> {
        let clamped = clamp_volume(level);
        self.store.set_volume(clamped).await;
        self.engine.set_volume(clamped).await?;
        Ok(())
    }

    /// Adjust the volume by a signed delta, clamped to `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine rejects the command or is unreachable.
    pub async fn adjust_volume(&self, delta: f32) -> Result<()> {
        let level = self.store.volume().await + delta;
        self.set_volume(level).await
    }

    /// Seek within the current track.
    ///
    /// The target is clamped to the track duration, the seek gate is armed
    /// so poll ticks are dropped, and the command is sent under a bounded
    /// timeout. On acknowledgment the playtime is re-queried immediately and
    /// that refreshed value (the engine may clamp or quantize) replaces the
    /// displayed position. On timeout or failure the gate is cleared so
    /// polling resumes and the prior position stays.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::NoTrackSelected`] without a current track,
    /// [`TransportError::SeekTimedOut`] when no acknowledgment arrives in
    /// time, or the engine error otherwise.
    pub async fn seek(&self, target_secs: f64) -> Result<()> {
        let Some(duration) = self.store.snapshot().await.current_duration() else {
            return Err(TransportError::NoTrackSelected);
        };

        let target = target_secs.clamp(0.0, duration);
        self.store.begin_seek(target, self.seek_timeout).await;

        match tokio::time::timeout(self.seek_timeout, self.engine.seek(target)).await {
            Ok(Ok(())) => match self.engine.playtime().await {
                Ok(refreshed) => {
                    self.store.complete_seek(refreshed).await;
                    Ok(())
                }
                Err(e) => {
                    warn!("Post-seek playtime refresh failed: {}", e);
                    self.store.cancel_seek().await;
                    Err(e.into())
                }
            },
            Ok(Err(e)) => {
                warn!("Seek command failed: {}", e);
                self.store.cancel_seek().await;
                Err(e.into())
            }
            Err(_) => {
                warn!(
                    "Seek to {}s not acknowledged within {:?}, resuming polling",
                    target, self.seek_timeout
                );
                self.store.cancel_seek().await;
                Err(TransportError::SeekTimedOut {
                    target_secs: target,
                })
            }
        }
    }

    /// Pull the current track's album cover, falling back to the built-in
    /// placeholder when the track has none or the pull fails. Never an
    /// error: missing art is not a fault condition.
    pub async fn album_cover(&self) -> Vec<u8> {
        match self.engine.album_cover().await {
            Ok(Some(bytes)) if !bytes.is_empty() => bytes,
            Ok(_) => DEFAULT_ALBUM_COVER.to_vec(),
            Err(e) => {
                debug!("Album cover pull failed, using placeholder: {}", e);
                DEFAULT_ALBUM_COVER.to_vec()
            }
        }
    }
}
