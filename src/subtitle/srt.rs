// SRT subtitle format
use super::timestamp::{format_timestamp, parse_timestamp, strip_markup};
use super::{Segment, SegmentFormatter};
use crate::error::{DubsyncError, Result};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

static BLOCK_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("Invalid block separator regex"));

static TIMING_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\S+)\s+-->\s+(\S+)").expect("Invalid timing line regex"));

pub struct SrtFormatter;

impl SegmentFormatter for SrtFormatter {
    fn format(&self, segments: &[Segment]) -> String {
        to_srt_string(segments)
    }
}

/// Serialize segments with 1-based display indices, each block followed by a blank line.
pub fn to_srt_string(segments: &[Segment]) -> String {
    segments
        .iter()
        .enumerate()
        .map(|(i, segment)| {
            format!(
                "{}\n{} --> {}\n{}\n\n",
                i + 1,
                format_timestamp(segment.start),
                format_timestamp(segment.end),
                segment.text
            )
        })
        .collect()
}

/// Parse SRT text. Malformed blocks are skipped; zero surviving blocks is an error.
///
/// `source` only names the input in the error message.
pub fn parse_srt(content: &str, source: &str) -> Result<Vec<Segment>> {
    let normalized = content.replace("\r\n", "\n");
    let mut segments = Vec::new();

    for (block_no, block) in BLOCK_SEPARATOR.split(normalized.trim()).enumerate() {
        match parse_block(block) {
            Some((start, end, text)) => {
                segments.push(Segment::new(segments.len(), start, end, text));
            }
            None => debug!("Skipping malformed SRT block #{}", block_no + 1),
        }
    }

    if segments.is_empty() {
        return Err(DubsyncError::NoSegmentsFound(source.to_string()));
    }

    debug!("Parsed {} segments from {}", segments.len(), source);
    Ok(segments)
}

fn parse_block(block: &str) -> Option<(f64, f64, String)> {
    let lines: Vec<&str> = block.trim().lines().collect();
    if lines.len() < 3 {
        return None;
    }

    // The declared index is validated but not kept.
    lines[0].trim().parse::<i64>().ok()?;

    let captures = TIMING_LINE.captures(lines[1].trim())?;
    let start = parse_timestamp(&captures[1]).ok()?;
    let end = parse_timestamp(&captures[2]).ok()?;

    let joined = lines[2..]
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    let text = strip_markup(&joined).trim().to_string();

    if text.is_empty() {
        return None;
    }

    Some((start, end, text))
}

/// Read and parse an SRT file.
pub fn parse_srt_file(path: &Path) -> Result<Vec<Segment>> {
    if !path.exists() {
        return Err(DubsyncError::FileNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    parse_srt(&content, &path.display().to_string())
}

/// Write segments to an SRT file, creating parent directories as needed.
pub fn save_srt_file(segments: &[Segment], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, to_srt_string(segments))?;
    Ok(())
}

/// Outcome of [`validate_segments`]. Warnings never affect `valid`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub valid: bool,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

/// Check timing polarity, chronological order and overlap across a segment list.
pub fn validate_segments(segments: &[Segment]) -> ValidationReport {
    let mut warnings = Vec::new();
    let mut errors = Vec::new();

    for (i, segment) in segments.iter().enumerate() {
        if segment.start < 0.0 || segment.end < 0.0 {
            errors.push(format!(
                "Segment {i}: Negative timestamp (start={}, end={})",
                segment.start, segment.end
            ));
        }

        if segment.start >= segment.end {
            errors.push(format!(
                "Segment {i}: Start time >= end time ({} >= {})",
                segment.start, segment.end
            ));
        }

        if segment.text.trim().is_empty() {
            warnings.push(format!("Segment {i}: Empty text"));
        }

        if let Some(prev) = i.checked_sub(1).map(|p| &segments[p]) {
            if segment.start < prev.start {
                errors.push(format!(
                    "Segment {i}: Not in chronological order ({} < {})",
                    segment.start, prev.start
                ));
            } else if segment.start < prev.end {
                warnings.push(format!(
                    "Segment {i}: Overlaps with previous segment ({} < {})",
                    segment.start, prev.end
                ));
            }
        }
    }

    ValidationReport {
        valid: errors.is_empty(),
        warnings,
        errors,
    }
}
