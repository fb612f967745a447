//! Single source of truth for UI-observable playback state.
//!
//! Three writers feed the store: the playtime poller, the engine event
//! bridge, and transport command acknowledgments. Each field has a defined
//! writer set and engine push truth always wins over optimistic transport
//! writes; the reconciliation lives here rather than in overwrite order at
//! the call sites.

use crate::error::CoreError;
use crate::playback::{clamp_volume, PlaybackState, PlaybackStatus, Track};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, warn};

/// Events emitted whenever an observable field changes, consumed by the
/// rendering layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StateEvent {
    /// The playlist was replaced wholesale.
    PlaylistReplaced { len: usize },
    /// The current track changed.
    TrackChanged { index: usize },
    /// The transport status changed.
    StatusChanged { status: PlaybackStatus },
    /// The elapsed playtime was updated.
    PositionUpdated { elapsed_secs: f64 },
    /// The volume was updated.
    VolumeChanged { level: f32 },
}

/// Transient seek suppression flag.
///
/// Active from the moment a seek command is issued until its refreshed
/// playtime is observed. Poll deliveries are dropped while active so a stale
/// value cannot overwrite the just-requested position. The deadline bounds
/// the suppression: if no acknowledgment ever arrives, polling resumes
/// instead of deadlocking the display.
#[derive(Debug, Clone, Copy)]
struct SeekGate {
    target_secs: f64,
    deadline: Instant,
}

struct StoreInner {
    state: PlaybackState,
    seek: Option<SeekGate>,
    /// When the last engine push notification wrote status or track index.
    /// Transport acknowledgments issued before this instant are stale.
    last_push_write: Option<Instant>,
}

/// The one playback state instance for the session, with reconciliation of
/// its concurrent writers.
pub struct StateStore {
    inner: RwLock<StoreInner>,
    event_tx: broadcast::Sender<StateEvent>,
}

impl StateStore {
    /// Create a new store holding the initial (stopped, empty) state.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Create a store whose event channel buffers `capacity` events before
    /// slow subscribers start lagging. Wired from
    /// [`SyncConfig::event_capacity`](crate::config::SyncConfig).
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero; [`Config`](crate::config::Config)
    /// validation rejects that before it gets here.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Arc<Self> {
        let (event_tx, _) = broadcast::channel(capacity);
        Arc::new(Self {
            inner: RwLock::new(StoreInner {
                state: PlaybackState::default(),
                seek: None,
                last_push_write: None,
            }),
            event_tx,
        })
    }

    /// Subscribe to state change events.
    pub fn subscribe(&self) -> broadcast::Receiver<StateEvent> {
        self.event_tx.subscribe()
    }

    /// Get a snapshot of the full current state.
    pub async fn snapshot(&self) -> PlaybackState {
        self.inner.read().await.state.clone()
    }

    /// Get the current transport status.
    pub async fn status(&self) -> PlaybackStatus {
        self.inner.read().await.state.status
    }

    /// Get the current track index, if a track is selected.
    pub async fn current_track(&self) -> Option<usize> {
        self.inner.read().await.state.current_track
    }

    /// Get the elapsed playtime in seconds.
    pub async fn elapsed_secs(&self) -> f64 {
        self.inner.read().await.state.elapsed_secs
    }

    /// Get the current volume.
    pub async fn volume(&self) -> f32 {
        self.inner.read().await.state.volume
    }

    /// Replace the playlist atomically.
    ///
    /// Written only by the `open` handling path. A current index that no
    /// longer fits the new playlist is cleared along with the position; a
    /// surviving selection may now address a shorter track, so the position
    /// is clamped to the new duration.
    pub async fn replace_playlist(&self, tracks: Vec<Track>) {
        let mut inner = self.inner.write().await;
        let len = tracks.len();
        let mut moved_position = None;

        if inner
            .state
            .current_track
            .is_some_and(|index| index >= len)
        {
            debug!("Current track no longer exists in new playlist, clearing selection");
            inner.state.current_track = None;
            if inner.state.elapsed_secs != 0.0 {
                inner.state.elapsed_secs = 0.0;
                moved_position = Some(0.0);
            }
        }

        inner.state.playlist = tracks;

        if let Some(duration) = inner.state.current_duration() {
            if inner.state.elapsed_secs > duration {
                inner.state.elapsed_secs = duration;
                moved_position = Some(duration);
            }
        }
        drop(inner);

        self.emit(StateEvent::PlaylistReplaced { len });
        if let Some(elapsed_secs) = moved_position {
            self.emit(StateEvent::PositionUpdated { elapsed_secs });
        }
    }

    /// Apply a `track_changed` push notification.
    ///
    /// The engine is authoritative for which track becomes current: this
    /// sets the index, forces status to Playing and rewinds the position.
    /// An index outside the current playlist is a contract violation and is
    /// rejected without touching the state.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::TrackIndexOutOfRange`] when `index` does not
    /// address a playlist entry.
    pub async fn apply_track_changed(&self, index: usize) -> Result<(), CoreError> {
        let mut inner = self.inner.write().await;
        let len = inner.state.playlist.len();
        if index >= len {
            return Err(CoreError::TrackIndexOutOfRange { index, len });
        }

        inner.last_push_write = Some(Instant::now());
        let status_changed = inner.state.status != PlaybackStatus::Playing;
        inner.state.current_track = Some(index);
        inner.state.status = PlaybackStatus::Playing;
        inner.state.elapsed_secs = 0.0;
        drop(inner);

        self.emit(StateEvent::TrackChanged { index });
        if status_changed {
            self.emit(StateEvent::StatusChanged {
                status: PlaybackStatus::Playing,
            });
        }
        self.emit(StateEvent::PositionUpdated { elapsed_secs: 0.0 });
        Ok(())
    }

    /// Apply a `playback_stopped` push notification.
    ///
    /// Engine-initiated stop (e.g. end of playlist): only the status moves;
    /// the playlist and current track selection stay for display.
    pub async fn apply_engine_stopped(&self) {
        let mut inner = self.inner.write().await;
        inner.last_push_write = Some(Instant::now());
        let changed = inner.state.status != PlaybackStatus::Stopped;
        inner.state.status = PlaybackStatus::Stopped;
        drop(inner);

        if changed {
            self.emit(StateEvent::StatusChanged {
                status: PlaybackStatus::Stopped,
            });
        }
    }

    /// Apply a transport command acknowledgment for `status`.
    ///
    /// `issued_at` is the instant the command was sent. If an engine push
    /// notification wrote status after that instant, the acknowledgment is
    /// stale and dropped: push truth outranks the UI's assumption about its
    /// own command. A stop acknowledgment also rewinds the position.
    pub async fn apply_ack_status(&self, status: PlaybackStatus, issued_at: Instant) {
        let mut inner = self.inner.write().await;

        if inner
            .last_push_write
            .is_some_and(|push_at| push_at >= issued_at)
        {
            debug!(
                ?status,
                "Dropping stale command acknowledgment superseded by engine event"
            );
            return;
        }

        let changed = inner.state.status != status;
        inner.state.status = status;

        let rewound = if status == PlaybackStatus::Stopped && inner.state.elapsed_secs != 0.0 {
            inner.state.elapsed_secs = 0.0;
            true
        } else {
            false
        };
        drop(inner);

        if changed {
            self.emit(StateEvent::StatusChanged { status });
        }
        if rewound {
            self.emit(StateEvent::PositionUpdated { elapsed_secs: 0.0 });
        }
    }

    /// Deliver a polled playtime value.
    ///
    /// Ignored while a seek is in flight (the value is stale by definition)
    /// and when no track is selected. Otherwise the value replaces the
    /// elapsed time, clamped to the current track's duration.
    pub async fn record_playtime(&self, elapsed_secs: f64) {
        let mut inner = self.inner.write().await;

        if let Some(gate) = inner.seek {
            if gate.deadline > Instant::now() {
                debug!(
                    target = gate.target_secs,
                    polled = elapsed_secs,
                    "Dropping poll tick while seek is in flight"
                );
                return;
            }
            warn!(
                target = gate.target_secs,
                "Seek acknowledgment never arrived, resuming polling"
            );
            inner.seek = None;
        }

        let Some(duration) = inner.state.current_duration() else {
            return;
        };

        let clamped = elapsed_secs.clamp(0.0, duration);
        inner.state.elapsed_secs = clamped;
        drop(inner);

        self.emit(StateEvent::PositionUpdated {
            elapsed_secs: clamped,
        });
    }

    /// Arm the seek gate before sending a seek command.
    ///
    /// Poll deliveries are suppressed until [`Self::complete_seek`],
    /// [`Self::cancel_seek`], or the deadline, whichever comes first.
    pub async fn begin_seek(&self, target_secs: f64, timeout: Duration) {
        let mut inner = self.inner.write().await;
        inner.seek = Some(SeekGate {
            target_secs,
            deadline: Instant::now() + timeout,
        });
        debug!(target = target_secs, "Seek in flight, poll updates suspended");
    }

    /// Clear the seek gate and apply the post-seek refreshed playtime.
    ///
    /// `refreshed_secs` comes from re-querying the engine after the seek
    /// acknowledgment, not from the requested target: the engine may have
    /// clamped or quantized the position.
    pub async fn complete_seek(&self, refreshed_secs: f64) {
        let mut inner = self.inner.write().await;
        inner.seek = None;

        let Some(duration) = inner.state.current_duration() else {
            return;
        };

        let clamped = refreshed_secs.clamp(0.0, duration);
        inner.state.elapsed_secs = clamped;
        drop(inner);

        self.emit(StateEvent::PositionUpdated {
            elapsed_secs: clamped,
        });
    }

    /// Clear the seek gate without applying a position, so polling resumes.
    /// Used when the seek command times out or fails.
    pub async fn cancel_seek(&self) {
        self.inner.write().await.seek = None;
    }

    /// Whether a seek is currently in flight. An expired gate counts as not
    /// in flight and is cleared on the spot.
    pub async fn seek_in_flight(&self) -> bool {
        let mut inner = self.inner.write().await;
        match inner.seek {
            Some(gate) if gate.deadline > Instant::now() => true,
            Some(_) => {
                inner.seek = None;
                false
            }
            None => false,
        }
    }

    /// Set the volume, clamped to `[0, 1]`.
    ///
    /// Used both for optimistic user input and for `volume_updated` re-pulls;
    /// either way the write is a total replacement of the value.
    pub async fn set_volume(&self, level: f32) {
        let clamped = clamp_volume(level);
        self.inner.write().await.state.volume = clamped;
        self.emit(StateEvent::VolumeChanged { level: clamped });
    }

    fn emit(&self, event: StateEvent) {
        // Nobody listening is fine; rendering may not have subscribed yet.
        let _ = self.event_tx.send(event);
    }
}

impl Default for StateStore {
    fn default() -> Self {
        let (event_tx, _) = broadcast::channel(64);
        Self {
            inner: RwLock::new(StoreInner {
                state: PlaybackState::default(),
                seek: None,
                last_push_write: None,
            }),
            event_tx,
        }
    }
}
