use serde::{Deserialize, Serialize};

/// Transport status of the player.
///
/// `Stopped` is the universal initial state; every other transition goes
/// through a [`TransportController`](crate) command acknowledgment or an
/// engine push notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackStatus {
    /// Nothing is playing; the position counter is idle.
    #[default]
    Stopped,
    /// A track is actively playing.
    Playing,
    /// Playback is suspended and can resume at the current position.
    Paused,
}

/// A single playlist entry.
///
/// Tracks are immutable once loaded and are identified by their position in
/// the active playlist. Artist and album come from file tags and may be
/// absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Track title (falls back to the file name when untagged).
    pub title: String,
    /// Artist name, if tagged.
    pub artist: Option<String>,
    /// Album name, if tagged.
    pub album: Option<String>,
    /// Total track length in seconds.
    pub duration_secs: f64,
}

impl Track {
    /// Create a new track with just a title and duration.
    pub fn new(title: impl Into<String>, duration_secs: f64) -> Self {
        Self {
            title: title.into(),
            artist: None,
            album: None,
            duration_secs,
        }
    }

    /// Set the artist name.
    #[must_use]
    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    /// Set the album name.
    #[must_use]
    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }
}

/// UI-observable playback state aggregate.
///
/// Exactly one instance exists per session, owned by the
/// [`StateStore`](crate::StateStore). Invariants:
///
/// - `current_track`, when `Some`, indexes an existing playlist entry
/// - `elapsed_secs` stays within `[0, duration]` of the current track
/// - `volume` is always within `[0, 1]`
#[derive(Debug, Clone)]
pub struct PlaybackState {
    /// Current transport status.
    pub status: PlaybackStatus,
    /// Index of the current track in the playlist, if one is selected.
    pub current_track: Option<usize>,
    /// Elapsed playtime of the current track, in seconds.
    pub elapsed_secs: f64,
    /// Output volume in `[0, 1]`.
    pub volume: f32,
    /// The active playlist, replaced atomically on load.
    pub playlist: Vec<Track>,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            status: PlaybackStatus::Stopped,
            current_track: None,
            elapsed_secs: 0.0,
            volume: 1.0,
            playlist: Vec::new(),
        }
    }
}

impl PlaybackState {
    /// Get the currently selected track, if any.
    #[must_use]
    pub fn current(&self) -> Option<&Track> {
        self.current_track.and_then(|index| self.playlist.get(index))
    }

    /// Duration of the current track in seconds, if one is selected.
    #[must_use]
    pub fn current_duration(&self) -> Option<f64> {
        self.current().map(|track| track.duration_secs)
    }
}

/// Clamp a volume level to the valid `[0, 1]` range.
#[must_use]
pub fn clamp_volume(level: f32) -> f32 {
    level.clamp(0.0, 1.0)
}
