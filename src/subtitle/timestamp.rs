// SRT timestamp codec
use crate::error::{DubsyncError, Result};
use regex::Regex;
use std::sync::LazyLock;

static MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("Invalid markup regex"));

/// Parse `HH:MM:SS,mmm` (or `HH:MM:SS.mmm`) into seconds.
pub fn parse_timestamp(text: &str) -> Result<f64> {
    let normalized = text.trim().replace(',', ".");
    let parts: Vec<&str> = normalized.split(':').collect();

    if parts.len() != 3 {
        return Err(DubsyncError::Timestamp(text.to_string()));
    }

    let hours: u64 = parts[0]
        .parse()
        .map_err(|_| DubsyncError::Timestamp(text.to_string()))?;
    let minutes: u64 = parts[1]
        .parse()
        .map_err(|_| DubsyncError::Timestamp(text.to_string()))?;
    let seconds: f64 = parts[2]
        .parse()
        .map_err(|_| DubsyncError::Timestamp(text.to_string()))?;

    let total = hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds;
    if !(seconds.is_finite() && total.is_finite()) {
        return Err(DubsyncError::Timestamp(text.to_string()));
    }

    Ok(total)
}

/// Format seconds as `HH:MM:SS,mmm`. Negative input is clamped to zero.
pub fn format_timestamp(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;
    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

/// Remove `<...>` tag spans such as `<i>` or `<font color="red">`.
pub fn strip_markup(text: &str) -> String {
    MARKUP.replace_all(text, "").into_owned()
}
