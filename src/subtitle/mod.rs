pub mod json;
pub mod merge;
pub mod srt;
pub mod timestamp;

pub use merge::{merge_segments, renumber, select_voice_samples};
pub use srt::{
    parse_srt, parse_srt_file, save_srt_file, to_srt_string, validate_segments, ValidationReport,
};
pub use timestamp::{format_timestamp, parse_timestamp, strip_markup};

use crate::config::OutputFormat;
use crate::error::{DubsyncError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub trait SegmentFormatter {
    fn format(&self, segments: &[Segment]) -> String;
}

pub fn create_formatter(format: OutputFormat) -> Box<dyn SegmentFormatter> {
    match format {
        OutputFormat::Srt => Box::new(srt::SrtFormatter),
        OutputFormat::Json => Box::new(json::JsonFormatter),
    }
}

/// Load a segment list from an `.srt` or `.json` file.
pub fn load_segments(path: &Path) -> Result<Vec<Segment>> {
    match OutputFormat::from_path(path) {
        Some(OutputFormat::Srt) => parse_srt_file(path),
        Some(OutputFormat::Json) => json::load_segments_json(path),
        None => Err(DubsyncError::UnsupportedFormat(format!(
            "{} (expected .srt or .json)",
            path.display()
        ))),
    }
}

/// Write a segment list in the given format, creating parent directories.
pub fn save_segments(segments: &[Segment], path: &Path, format: OutputFormat) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let formatter = create_formatter(format);
    std::fs::write(path, formatter.format(segments))?;
    Ok(())
}

/// A timed span of speech or subtitle text, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: usize,
    pub start: f64,
    pub end: f64,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,
}

impl Segment {
    pub fn new(id: usize, start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            id,
            start,
            end,
            text: text.into(),
            original_text: None,
        }
    }

    /// Build a segment, rejecting negative or reversed timing and blank text.
    pub fn checked(id: usize, start: f64, end: f64, text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if !start.is_finite() || !end.is_finite() {
            return Err(DubsyncError::InvalidSegment(format!(
                "segment {id}: non-finite timestamp"
            )));
        }
        if start < 0.0 {
            return Err(DubsyncError::InvalidSegment(format!(
                "segment {id}: negative start {start}"
            )));
        }
        if start >= end {
            return Err(DubsyncError::InvalidSegment(format!(
                "segment {id}: start {start} >= end {end}"
            )));
        }
        if text.trim().is_empty() {
            return Err(DubsyncError::InvalidSegment(format!(
                "segment {id}: empty text"
            )));
        }
        Ok(Self::new(id, start, end, text))
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Copy of this segment carrying translated text; the current text moves to `original_text`.
    pub fn translated(&self, text: impl Into<String>) -> Self {
        Self {
            id: self.id,
            start: self.start,
            end: self.end,
            text: text.into(),
            original_text: Some(self.original_text.clone().unwrap_or_else(|| self.text.clone())),
        }
    }
}

/// Space-joined text of all segments, as sent to forced alignment.
pub fn join_text(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|s| s.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
