//! Seek-bar gesture mapping.
//!
//! Converts a pointer position within the on-screen seek control into a
//! target playtime to send as a seek command.

/// Bounds of the seek control, in the same coordinate space as the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeekBarBounds {
    /// Coordinate of the control's leading edge.
    pub origin: f64,
    /// Width of the control.
    pub width: f64,
}

impl SeekBarBounds {
    /// Create bounds from an origin coordinate and a width.
    #[must_use]
    pub const fn new(origin: f64, width: f64) -> Self {
        Self { origin, width }
    }
}

/// Map a pointer position to a target playtime in seconds.
///
/// The pointer's fractional position within `bounds` is interpolated
/// linearly over `total_secs` and clamped to `[0, total_secs]`. Bounds of
/// zero (or negative) width map to 0 rather than dividing by zero.
#[must_use]
pub fn map_to_seconds(pointer: f64, bounds: SeekBarBounds, total_secs: f64) -> f64 {
    if bounds.width <= 0.0 || total_secs <= 0.0 {
        return 0.0;
    }

    let fraction = ((pointer - bounds.origin) / bounds.width).clamp(0.0, 1.0);
    fraction * total_secs
}
