pub mod bridge;
pub mod controller;
pub mod error;
pub mod poller;

pub use bridge::EventBridge;
pub use controller::{TransportController, DEFAULT_ALBUM_COVER};
pub use error::TransportError;
pub use poller::PlaytimePoller;
