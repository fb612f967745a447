//! The seam to the out-of-process playback engine.

use crate::playback::Track;
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;

/// Push notification from the engine.
///
/// Notifications are unsolicited and may arrive at any time, including for
/// changes this UI never requested (a track finishing, an OS-level volume
/// change). Some notifications carry no data and act purely as a signal to
/// re-pull the affected value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    /// A new playlist is ready. Carries no payload; the playlist must be
    /// re-pulled with [`PlayerEngine::playlist`].
    Open,
    /// The engine switched to the track at this playlist index.
    TrackChanged(usize),
    /// Engine-initiated stop, e.g. the playlist ran out.
    PlaybackStopped,
    /// Volume changed outside this UI. Carries no payload; re-pull with
    /// [`PlayerEngine::volume`].
    VolumeUpdated,
}

/// Errors surfaced by the engine interface.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine process or transport could not be reached.
    #[error("engine unreachable: {reason}")]
    Unreachable { reason: String },

    /// The engine declined a command (e.g. seek past end of track).
    #[error("engine rejected command: {reason}")]
    CommandRejected { reason: String },

    /// A pull query failed; callers keep the last known value.
    #[error("engine query failed: {reason}")]
    QueryFailed { reason: String },
}

/// Interface to the authoritative playback engine.
///
/// The engine performs the actual decoding and output and is the source of
/// truth for real playback state. Commands are best-effort requests with no
/// built-in retry; the engine confirms track changes through
/// [`EngineEvent::TrackChanged`] rather than synchronous responses, because
/// an advance can fail (end of playlist) or happen engine-side without any
/// command from this UI.
///
/// Implementations bind these calls to whatever transport the target
/// environment provides; this layer is transport-agnostic.
#[async_trait]
pub trait PlayerEngine: Send + Sync {
    /// Start or resume playback.
    async fn play(&self) -> Result<(), EngineError>;

    /// Pause playback at the current position.
    async fn pause(&self) -> Result<(), EngineError>;

    /// Stop playback and rewind.
    async fn stop(&self) -> Result<(), EngineError>;

    /// Request an advance to the next track. Confirmation arrives via
    /// [`EngineEvent::TrackChanged`], never synchronously.
    async fn next(&self) -> Result<(), EngineError>;

    /// Request a retreat to the previous track. Confirmation arrives via
    /// [`EngineEvent::TrackChanged`], never synchronously.
    async fn previous(&self) -> Result<(), EngineError>;

    /// Request a switch to the track at `index`. Confirmation arrives via
    /// [`EngineEvent::TrackChanged`], never synchronously.
    async fn change_track(&self, index: usize) -> Result<(), EngineError>;

    /// Seek within the current track. The engine may clamp or quantize the
    /// position; callers re-pull [`PlayerEngine::playtime`] after the
    /// acknowledgment rather than trusting the requested value.
    async fn seek(&self, position_secs: f64) -> Result<(), EngineError>;

    /// Set the output volume, expected in `[0, 1]`.
    async fn set_volume(&self, level: f32) -> Result<(), EngineError>;

    /// Pull the full current playlist.
    async fn playlist(&self) -> Result<Vec<Track>, EngineError>;

    /// Pull the elapsed playtime of the current track, in seconds.
    async fn playtime(&self) -> Result<f64, EngineError>;

    /// Pull the current output volume.
    async fn volume(&self) -> Result<f32, EngineError>;

    /// Pull the album cover of the current track, if one is embedded.
    async fn album_cover(&self) -> Result<Option<Vec<u8>>, EngineError>;

    /// Subscribe to push notifications. Subscriptions are established once
    /// at session start and stay live for the process lifetime.
    fn notifications(&self) -> broadcast::Receiver<EngineEvent>;
}
