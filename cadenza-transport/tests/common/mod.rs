//! Test support: an in-process scripted engine double.

// Each test binary compiles its own copy and uses a different subset.
#![allow(dead_code)]

use async_trait::async_trait;
use cadenza_core::{EngineError, EngineEvent, PlayerEngine, StateEvent, Track};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, Notify};

/// Engine double driven entirely by the test: scripted playtime query
/// results, a command log, and manually emitted push notifications.
pub struct ScriptedEngine {
    inner: Mutex<Inner>,
    events_tx: broadcast::Sender<EngineEvent>,
    hold_seek: AtomicBool,
    seek_release: Notify,
}

struct Inner {
    playlist: Vec<Track>,
    playlist_fails: bool,
    playtimes: VecDeque<f64>,
    last_playtime: f64,
    volume: f32,
    cover: Option<Vec<u8>>,
    cover_fails: bool,
    commands: Vec<String>,
}

impl ScriptedEngine {
    pub fn new() -> Arc<Self> {
        let (events_tx, _) = broadcast::channel(16);
        Arc::new(Self {
            inner: Mutex::new(Inner {
                playlist: Vec::new(),
                playlist_fails: false,
                playtimes: VecDeque::new(),
                last_playtime: 0.0,
                volume: 1.0,
                cover: None,
                cover_fails: false,
                commands: Vec::new(),
            }),
            events_tx,
            hold_seek: AtomicBool::new(false),
            seek_release: Notify::new(),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("engine mutex poisoned")
    }

    pub fn set_playlist(&self, tracks: Vec<Track>) {
        self.lock().playlist = tracks;
    }

    pub fn fail_playlist(&self) {
        self.lock().playlist_fails = true;
    }

    /// Queue playtime query results; once drained, the last value repeats.
    pub fn push_playtimes(&self, values: &[f64]) {
        self.lock().playtimes.extend(values.iter().copied());
    }

    pub fn set_volume_value(&self, level: f32) {
        self.lock().volume = level;
    }

    pub fn set_cover(&self, cover: Option<Vec<u8>>) {
        self.lock().cover = cover;
    }

    pub fn fail_cover(&self) {
        self.lock().cover_fails = true;
    }

    /// Emit a push notification to all subscribers.
    pub fn emit(&self, event: EngineEvent) {
        let _ = self.events_tx.send(event);
    }

    /// Make the next seek command block until [`Self::release_seek`].
    pub fn hold_seek(&self) {
        self.hold_seek.store(true, Ordering::SeqCst);
    }

    pub fn release_seek(&self) {
        self.hold_seek.store(false, Ordering::SeqCst);
        self.seek_release.notify_one();
    }

    /// The commands received so far, in order.
    pub fn commands(&self) -> Vec<String> {
        self.lock().commands.clone()
    }

    fn record(&self, command: impl Into<String>) {
        self.lock().commands.push(command.into());
    }
}

#[async_trait]
impl PlayerEngine for ScriptedEngine {
    async fn play(&self) -> Result<(), EngineError> {
        self.record("play");
        Ok(())
    }

    async fn pause(&self) -> Result<(), EngineError> {
        self.record("pause");
        Ok(())
    }

    async fn stop(&self) -> Result<(), EngineError> {
        self.record("stop");
        Ok(())
    }

    async fn next(&self) -> Result<(), EngineError> {
        self.record("next");
        Ok(())
    }

    async fn previous(&self) -> Result<(), EngineError> {
        self.record("previous");
        Ok(())
    }

    async fn change_track(&self, index: usize) -> Result<(), EngineError> {
        self.record(format!("change_track {index}"));
        Ok(())
    }

    async fn seek(&self, position_secs: f64) -> Result<(), EngineError> {
        self.record(format!("seek {position_secs}"));
        if self.hold_seek.load(Ordering::SeqCst) {
            self.seek_release.notified().await;
        }
        Ok(())
    }

    async fn set_volume(&self, level: f32) -> Result<(), EngineError> {
        self.record(format!("set_volume {level:.2}"));
        self.lock().volume = level;
        Ok(())
    }

    async fn playlist(&self) -> Result<Vec<Track>, EngineError> {
        let inner = self.lock();
        if inner.playlist_fails {
            return Err(EngineError::QueryFailed {
                reason: "playlist unavailable".to_string(),
            });
        }
        Ok(inner.playlist.clone())
    }

    async fn playtime(&self) -> Result<f64, EngineError> {
        let mut inner = self.lock();
        if let Some(value) = inner.playtimes.pop_front() {
            inner.last_playtime = value;
        }
        Ok(inner.last_playtime)
    }

    async fn volume(&self) -> Result<f32, EngineError> {
        Ok(self.lock().volume)
    }

    async fn album_cover(&self) -> Result<Option<Vec<u8>>, EngineError> {
        let inner = self.lock();
        if inner.cover_fails {
            return Err(EngineError::QueryFailed {
                reason: "no cover".to_string(),
            });
        }
        Ok(inner.cover.clone())
    }

    fn notifications(&self) -> broadcast::Receiver<EngineEvent> {
        self.events_tx.subscribe()
    }
}

/// Receive state events until one matches, panicking after a deadline.
pub async fn wait_for<F>(
    rx: &mut broadcast::Receiver<StateEvent>,
    mut matches: F,
) -> StateEvent
where
    F: FnMut(&StateEvent) -> bool,
{
    tokio::time::timeout(Duration::from_secs(30), async {
        loop {
            let event = rx.recv().await.expect("state event channel closed");
            if matches(&event) {
                return event;
            }
        }
    })
    .await
    .expect("timed out waiting for state event")
}

/// Yield enough times for freshly spawned tasks to reach their first await
/// point, without letting virtual time advance.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}
