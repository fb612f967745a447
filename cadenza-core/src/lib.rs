pub mod config;
pub mod engine;
pub mod error;
pub mod gesture;
pub mod paths;
pub mod playback;
pub mod store;
pub mod time;

pub use config::{Config, SyncConfig};
pub use engine::{EngineError, EngineEvent, PlayerEngine};
pub use error::CoreError;
pub use gesture::{map_to_seconds, SeekBarBounds};
pub use paths::{config_dir, config_path, CONFIG_DIR_NAME, CONFIG_FILE_NAME};
pub use playback::{clamp_volume, PlaybackState, PlaybackStatus, Track};
pub use store::{StateEvent, StateStore};
pub use time::format_playtime;
