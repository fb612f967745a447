use cadenza_core::{CoreError, EngineError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Seek to {target_secs}s was not acknowledged in time")]
    SeekTimedOut { target_secs: f64 },

    #[error("No track is selected")]
    NoTrackSelected,
}

pub type Result<T> = std::result::Result<T, TransportError>;
