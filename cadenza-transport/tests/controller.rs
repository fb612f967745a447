//! Transport command tests against a scripted engine.

mod common;

use cadenza_core::{
    CoreError, PlaybackStatus, PlayerEngine, StateStore, SyncConfig, Track,
};
use cadenza_transport::{TransportController, TransportError, DEFAULT_ALBUM_COVER};
use common::ScriptedEngine;
use std::sync::Arc;

fn two_tracks() -> Vec<Track> {
    vec![Track::new("first", 180.0), Track::new("second", 40.0)]
}

struct Harness {
    engine: Arc<ScriptedEngine>,
    store: Arc<StateStore>,
    controller: TransportController,
}

impl Harness {
    fn new() -> Self {
        let engine = ScriptedEngine::new();
        let engine_dyn: Arc<dyn PlayerEngine> = engine.clone();
        let store = StateStore::new();
        let controller =
            TransportController::new(engine_dyn, store.clone(), &SyncConfig::default());
        Self {
            engine,
            store,
            controller,
        }
    }

    async fn with_current_track(index: usize) -> Self {
        let h = Self::new();
        h.store.replace_playlist(two_tracks()).await;
        h.store.apply_track_changed(index).await.unwrap();
        h
    }
}

#[tokio::test]
async fn play_pause_stop_drive_status() {
    let h = Harness::with_current_track(0).await;
    h.store.record_playtime(30.0).await;

    h.controller.pause().await.unwrap();
    assert_eq!(h.store.status().await, PlaybackStatus::Paused);

    h.controller.play().await.unwrap();
    assert_eq!(h.store.status().await, PlaybackStatus::Playing);

    h.controller.stop().await.unwrap();
    let state = h.store.snapshot().await;
    assert_eq!(state.status, PlaybackStatus::Stopped);
    assert_eq!(state.elapsed_secs, 0.0);

    assert_eq!(h.engine.commands(), ["pause", "play", "stop"]);
}

#[tokio::test]
async fn play_and_pause_without_a_track_are_rejected() {
    let h = Harness::new();

    assert!(matches!(
        h.controller.play().await,
        Err(TransportError::NoTrackSelected)
    ));
    assert!(matches!(
        h.controller.pause().await,
        Err(TransportError::NoTrackSelected)
    ));

    // Nothing reached the engine and the state machine never left Stopped
    assert!(h.engine.commands().is_empty());
    assert_eq!(h.store.status().await, PlaybackStatus::Stopped);

    // Stop stays valid regardless
    h.controller.stop().await.unwrap();
    assert_eq!(h.engine.commands(), ["stop"]);
}

#[tokio::test]
async fn next_and_previous_never_touch_the_index() {
    let h = Harness::with_current_track(0).await;

    h.controller.next().await.unwrap();
    h.controller.previous().await.unwrap();

    // The index only moves when the engine confirms with track_changed
    assert_eq!(h.store.current_track().await, Some(0));
    assert_eq!(h.engine.commands(), ["next", "previous"]);
}

#[tokio::test]
async fn change_track_sends_command_without_assuming_success() {
    let h = Harness::with_current_track(0).await;

    h.controller.change_track(1).await.unwrap();

    assert_eq!(h.engine.commands(), ["change_track 1"]);
    assert_eq!(h.store.current_track().await, Some(0));
}

#[tokio::test]
async fn change_track_rejects_out_of_range_index() {
    let h = Harness::with_current_track(0).await;

    let result = h.controller.change_track(7).await;

    assert!(matches!(
        result,
        Err(TransportError::Core(CoreError::TrackIndexOutOfRange {
            index: 7,
            len: 2
        }))
    ));
    assert!(h.engine.commands().is_empty());
}

#[tokio::test]
async fn set_volume_is_optimistic_and_clamped() {
    let h = Harness::new();

    h.controller.set_volume(1.5).await.unwrap();
    assert_eq!(h.store.volume().await, 1.0);
    assert_eq!(h.engine.commands(), ["set_volume 1.00"]);

    h.controller.adjust_volume(-0.25).await.unwrap();
    assert!((h.store.volume().await - 0.75).abs() < 1e-6);
}

#[tokio::test]
async fn seek_applies_the_refreshed_playtime_not_the_target() {
    let h = Harness::with_current_track(0).await;
    // The engine quantizes the requested position
    h.engine.push_playtimes(&[169.5]);

    h.controller.seek(170.0).await.unwrap();

    assert_eq!(h.store.elapsed_secs().await, 169.5);
    assert!(!h.store.seek_in_flight().await);
    assert_eq!(h.engine.commands(), ["seek 170"]);
}

#[tokio::test]
async fn seek_clamps_the_target_to_the_track() {
    let h = Harness::with_current_track(1).await; // 40s track
    h.engine.push_playtimes(&[40.0]);

    h.controller.seek(500.0).await.unwrap();

    assert_eq!(h.engine.commands(), ["seek 40"]);
    assert_eq!(h.store.elapsed_secs().await, 40.0);
}

#[tokio::test]
async fn seek_without_a_track_is_rejected() {
    let h = Harness::new();

    let result = h.controller.seek(10.0).await;

    assert!(matches!(result, Err(TransportError::NoTrackSelected)));
    assert!(h.engine.commands().is_empty());
}

#[tokio::test(start_paused = true)]
async fn seek_timeout_clears_the_gate_and_keeps_the_position() {
    let h = Harness::with_current_track(0).await;
    h.store.record_playtime(30.0).await;
    h.engine.hold_seek();

    let result = h.controller.seek(170.0).await;

    assert!(matches!(
        result,
        Err(TransportError::SeekTimedOut { .. })
    ));
    assert_eq!(h.store.elapsed_secs().await, 30.0);
    assert!(!h.store.seek_in_flight().await);

    // Polling resumes instead of deadlocking the display
    h.store.record_playtime(31.0).await;
    assert_eq!(h.store.elapsed_secs().await, 31.0);
}

#[tokio::test]
async fn album_cover_falls_back_to_the_placeholder() {
    let h = Harness::new();
    assert_eq!(h.controller.album_cover().await, DEFAULT_ALBUM_COVER);

    h.engine.fail_cover();
    assert_eq!(h.controller.album_cover().await, DEFAULT_ALBUM_COVER);
}

#[tokio::test]
async fn album_cover_returns_embedded_art_when_present() {
    let h = Harness::new();
    h.engine.set_cover(Some(vec![0xff, 0xd8, 0xff]));

    assert_eq!(h.controller.album_cover().await, vec![0xff, 0xd8, 0xff]);
}
