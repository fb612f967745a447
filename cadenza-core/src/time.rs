//! Playtime display formatting.

/// Format a playtime in seconds as `M:SS`.
///
/// Minutes are unpadded, seconds are zero-padded to two digits, and
/// fractional seconds are truncated rather than rounded. There is no upper
/// bound on the minutes field.
///
/// Negative input is outside the contract; callers clamp before formatting.
#[must_use]
pub fn format_playtime(seconds: f64) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let total = seconds as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
